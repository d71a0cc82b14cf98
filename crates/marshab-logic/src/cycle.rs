//! Pressurization cycle state machine.
//!
//! An airlock chamber is always in one of four cycle states:
//!
//! | State | Doors | Steady? |
//! |-------|-------|---------|
//! | `Pressurized` | inner unlocked, outer locked | yes (initial) |
//! | `Depressurizing` | both locked | no |
//! | `Depressurized` | outer unlocked, inner locked | yes |
//! | `Pressurizing` | both locked | no |
//!
//! The machine cycles indefinitely; there is no terminal state. A cycle is
//! driven by the owner entity feeding elapsed millisols into [`PressureCycle::add_time`]
//! while the airlock is activated and transitioning. When the countdown
//! reaches zero the machine snaps to the next steady state, unlocks the
//! matching door and deactivates itself.
//!
//! Every transition attempt is a total function returning a success flag.
//! Calling a transition from the wrong state is routine (tasks race to start
//! cycles), not an error.

use serde::{Deserialize, Serialize};

/// Cycle constants (all times in millisols).
pub mod cycle_constants {
    /// Duration of one pressurize-or-depressurize countdown.
    pub const CYCLE_TIME: f64 = 10.0;
}

/// The four cycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleState {
    Pressurized,
    Depressurized,
    Pressurizing,
    Depressurizing,
}

/// The pressurization machine: cycle state, door locks, countdown timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureCycle {
    state: CycleState,
    /// True while the airlock is running a cycle (operator election and
    /// timekeeping only happen while activated).
    activated: bool,
    /// True while the owner tick should consume time toward the next
    /// steady state.
    transitioning: bool,
    inner_door_locked: bool,
    outer_door_locked: bool,
    /// Millisols left in the current cycle countdown.
    remaining_cycle_time: f64,
}

impl Default for PressureCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl PressureCycle {
    /// A fresh chamber starts pressurized with the inner door open.
    pub fn new() -> Self {
        Self {
            state: CycleState::Pressurized,
            activated: false,
            transitioning: false,
            inner_door_locked: false,
            outer_door_locked: true,
            remaining_cycle_time: cycle_constants::CYCLE_TIME,
        }
    }

    // ── Queries (side-effect free) ──────────────────────────────────────

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_pressurized(&self) -> bool {
        self.state == CycleState::Pressurized
    }

    pub fn is_depressurized(&self) -> bool {
        self.state == CycleState::Depressurized
    }

    pub fn is_pressurizing(&self) -> bool {
        self.state == CycleState::Pressurizing
    }

    pub fn is_depressurizing(&self) -> bool {
        self.state == CycleState::Depressurizing
    }

    pub fn is_inner_door_locked(&self) -> bool {
        self.inner_door_locked
    }

    pub fn is_outer_door_locked(&self) -> bool {
        self.outer_door_locked
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn remaining_cycle_time(&self) -> f64 {
        self.remaining_cycle_time
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Starts pressurizing. Valid only from `Depressurized`; locks both
    /// doors. Returns false and changes nothing from any other state.
    pub fn set_pressurizing(&mut self) -> bool {
        if self.state == CycleState::Depressurized {
            self.state = CycleState::Pressurizing;
            self.inner_door_locked = true;
            self.outer_door_locked = true;
            return true;
        }
        false
    }

    /// Starts depressurizing. Valid only from `Pressurized`; locks both
    /// doors. Returns false and changes nothing from any other state.
    pub fn set_depressurizing(&mut self) -> bool {
        if self.state == CycleState::Pressurized {
            self.state = CycleState::Depressurizing;
            self.inner_door_locked = true;
            self.outer_door_locked = true;
            return true;
        }
        false
    }

    /// Snaps a transition state to its steady state, unlocks the matching
    /// door, clears activation and resets the countdown.
    ///
    /// `Pressurizing` → `Pressurized` (inner unlocked, outer locked),
    /// `Depressurizing` → `Depressurized` (outer unlocked, inner locked).
    /// Returns false from a steady state.
    pub fn switch_to_steady_state(&mut self) -> bool {
        match self.state {
            CycleState::Pressurizing => {
                self.state = CycleState::Pressurized;
                self.inner_door_locked = false;
                self.outer_door_locked = true;
            }
            CycleState::Depressurizing => {
                self.state = CycleState::Depressurized;
                self.inner_door_locked = true;
                self.outer_door_locked = false;
            }
            _ => return false,
        }
        self.activated = false;
        self.transitioning = false;
        self.remaining_cycle_time = cycle_constants::CYCLE_TIME;
        log::debug!("airlock cycle reached steady state {:?}", self.state);
        true
    }

    /// Consumes elapsed time toward the next steady state and returns the
    /// amount actually consumed.
    ///
    /// No-op (returns 0) unless activated. Never consumes more than the
    /// remaining countdown; on reaching zero the countdown resets and the
    /// machine switches to the next steady state.
    pub fn add_time(&mut self, elapsed: f64) -> f64 {
        if !self.activated {
            return 0.0;
        }

        let consumed = self.remaining_cycle_time.min(elapsed);
        self.remaining_cycle_time -= consumed;

        if self.remaining_cycle_time <= 0.0 {
            self.remaining_cycle_time = cycle_constants::CYCLE_TIME;
            self.switch_to_steady_state();
        }

        consumed
    }

    /// Turns the cycle machinery on or off. Turning it on resets the
    /// countdown to the full cycle duration.
    pub fn set_activated(&mut self, value: bool) {
        if value {
            self.remaining_cycle_time = cycle_constants::CYCLE_TIME;
        }
        self.activated = value;
    }

    /// Allows or disallows the owner tick to consume cycle time.
    pub fn set_transitioning(&mut self, value: bool) {
        self.transitioning = value;
    }

    pub fn set_inner_door_locked(&mut self, locked: bool) {
        self.inner_door_locked = locked;
    }

    pub fn set_outer_door_locked(&mut self, locked: bool) {
        self.outer_door_locked = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycle_constants::CYCLE_TIME;

    #[test]
    fn test_initial_state_pressurized_inner_open() {
        let c = PressureCycle::new();
        assert_eq!(c.state(), CycleState::Pressurized);
        assert!(!c.is_inner_door_locked(), "inner door starts unlocked");
        assert!(c.is_outer_door_locked(), "outer door starts locked");
        assert!(!c.is_activated());
        assert_eq!(c.remaining_cycle_time(), CYCLE_TIME);
    }

    #[test]
    fn test_depressurize_only_from_pressurized() {
        let mut c = PressureCycle::new();
        assert!(c.set_depressurizing());
        assert_eq!(c.state(), CycleState::Depressurizing);
        assert!(c.is_inner_door_locked() && c.is_outer_door_locked());
        // Already depressurizing — second attempt must be rejected
        assert!(!c.set_depressurizing());
    }

    #[test]
    fn test_pressurize_only_from_depressurized() {
        let mut c = PressureCycle::new();
        assert!(!c.set_pressurizing(), "cannot pressurize while pressurized");
        c.set_depressurizing();
        c.switch_to_steady_state();
        assert_eq!(c.state(), CycleState::Depressurized);
        assert!(c.set_pressurizing());
        assert_eq!(c.state(), CycleState::Pressurizing);
    }

    #[test]
    fn test_repeat_pressurizing_leaves_timer_unchanged() {
        let mut c = PressureCycle::new();
        c.set_depressurizing();
        c.switch_to_steady_state();
        c.set_activated(true);
        c.set_pressurizing();
        c.add_time(3.0);
        let left = c.remaining_cycle_time();
        assert!(!c.set_pressurizing(), "already pressurizing");
        assert_eq!(c.remaining_cycle_time(), left);
    }

    #[test]
    fn test_steady_switch_unlocks_matching_door() {
        let mut c = PressureCycle::new();
        c.set_depressurizing();
        assert!(c.switch_to_steady_state());
        assert_eq!(c.state(), CycleState::Depressurized);
        assert!(c.is_inner_door_locked());
        assert!(!c.is_outer_door_locked());

        c.set_pressurizing();
        assert!(c.switch_to_steady_state());
        assert_eq!(c.state(), CycleState::Pressurized);
        assert!(!c.is_inner_door_locked());
        assert!(c.is_outer_door_locked());
    }

    #[test]
    fn test_steady_switch_rejected_from_steady_state() {
        let mut c = PressureCycle::new();
        assert!(!c.switch_to_steady_state());
        assert_eq!(c.state(), CycleState::Pressurized);
    }

    #[test]
    fn test_add_time_noop_unless_activated() {
        let mut c = PressureCycle::new();
        c.set_depressurizing();
        assert_eq!(c.add_time(5.0), 0.0);
        assert_eq!(c.remaining_cycle_time(), CYCLE_TIME);
    }

    #[test]
    fn test_add_time_counts_down_and_completes_cycle() {
        let mut c = PressureCycle::new();
        c.set_activated(true);
        c.set_depressurizing();

        assert_eq!(c.add_time(4.0), 4.0);
        assert_eq!(c.remaining_cycle_time(), CYCLE_TIME - 4.0);
        assert_eq!(c.state(), CycleState::Depressurizing);

        // More time offered than needed — only the remainder is consumed
        let consumed = c.add_time(100.0);
        assert_eq!(consumed, CYCLE_TIME - 4.0);
        assert_eq!(c.state(), CycleState::Depressurized);
        assert!(!c.is_activated(), "completing a cycle deactivates");
        assert_eq!(c.remaining_cycle_time(), CYCLE_TIME, "timer resets on steady state");
    }

    #[test]
    fn test_activation_resets_timer() {
        let mut c = PressureCycle::new();
        c.set_activated(true);
        c.set_depressurizing();
        c.add_time(7.5);
        assert!(c.remaining_cycle_time() < CYCLE_TIME);
        c.set_activated(true);
        assert_eq!(c.remaining_cycle_time(), CYCLE_TIME);
    }

    #[test]
    fn test_full_cycle_loops_indefinitely() {
        let mut c = PressureCycle::new();
        for _ in 0..3 {
            c.set_activated(true);
            assert!(c.set_depressurizing());
            while c.is_depressurizing() {
                c.add_time(1.0);
            }
            assert!(c.is_depressurized());

            c.set_activated(true);
            assert!(c.set_pressurizing());
            while c.is_pressurizing() {
                c.add_time(1.0);
            }
            assert!(c.is_pressurized());
        }
    }
}
