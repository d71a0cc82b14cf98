//! The airlock aggregate: transfer protocol, owner tick, and diagnostics.
//!
//! An [`Airlock`] is created once per building or vehicle and lives for the
//! entity's lifetime. It combines the pressurization machine, the occupancy
//! queues, the reservation board and the operator slot, and exposes the two
//! orchestration calls the task layer uses: [`Airlock::enter_airlock`] and
//! [`Airlock::exit_airlock`].
//!
//! Everything location-specific — actually relocating a settler to the
//! inside or outside, names for logging, placement coordinates — lives
//! behind the [`AirlockHost`] trait, supplied per call. The airlock itself
//! stores only occupant ids; live handles come from an [`OccupantLookup`]
//! resolved on demand and never cached.
//!
//! All outcomes are booleans consumed by the calling task layer, which owns
//! retry policy. A `false` means "not now" (door locked, chamber full,
//! wrong state, host refused), never a fault.
//!
//! Known gap, kept intentionally: when the `ingress`/`egress` host hook
//! fails after the queue transfer already succeeded, the occupant stays
//! counted in the chamber and the call returns false. The move is not
//! rolled back.

use serde::{Deserialize, Serialize};

use crate::cycle::{CycleState, PressureCycle};
use crate::election;
use crate::occupant::{OccupantHandle, OccupantId, OccupantLookup, Position};
use crate::queue::DoorQueues;
use crate::reservation::ReservationBoard;

/// What the airlock is currently being used for. Bookkeeping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirlockMode {
    NotInUse,
    Ingress,
    Egress,
}

/// The narrow per-location capability set an airlock is constructed against.
///
/// One implementation per owning entity kind (building, vehicle). The
/// airlock core is polymorphic over nothing else.
pub trait AirlockHost {
    /// Relocates the occupant's simulated position to outside. A false
    /// return refuses the move without corrupting airlock state (beyond the
    /// documented non-rollback of the queue transfer).
    fn egress(&self, occupant: &OccupantHandle) -> bool;

    /// Relocates the occupant's simulated position to inside.
    fn ingress(&self, occupant: &OccupantHandle) -> bool;

    /// Diagnostic name of the owning structure.
    fn entity_name(&self) -> String;

    /// Diagnostic locale of the owning structure.
    fn locale(&self) -> String;

    /// Placement coordinate on the interior side. Opaque to airlock logic.
    fn available_interior_position(&self) -> Position;

    /// Placement coordinate on the exterior side.
    fn available_exterior_position(&self) -> Position;

    /// Placement coordinate inside the chamber.
    fn available_airlock_position(&self) -> Position;
}

/// One airlock: pressure cycle, occupancy, reservations, diagnostics.
///
/// Serializable as-is — ids are the only occupant state it holds, so a
/// deserialized airlock is immediately usable with a fresh resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airlock {
    cycle: PressureCycle,
    queues: DoorQueues,
    reservations: ReservationBoard,
    mode: AirlockMode,
    /// Consecutive times no EVA suit was found available.
    suit_check_failures: u32,
}

impl Airlock {
    /// Creates an airlock whose chamber holds `capacity` occupants.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            cycle: PressureCycle::new(),
            queues: DoorQueues::new(capacity),
            reservations: ReservationBoard::new(),
            mode: AirlockMode::NotInUse,
            suit_check_failures: 0,
        }
    }

    // ── Transfer protocol ───────────────────────────────────────────────

    /// Moves an occupant from a door queue into the chamber.
    ///
    /// `from_inside` selects the inner door (egress direction); otherwise
    /// the outer door. The corresponding door must be unlocked and the
    /// chamber must have spare capacity. An occupant entering from outside
    /// is additionally handed to the host's `ingress` hook; its failure
    /// makes the call return false without undoing the queue transfer.
    pub fn enter_airlock(
        &mut self,
        id: OccupantId,
        from_inside: bool,
        host: &dyn AirlockHost,
        lookup: &dyn OccupantLookup,
    ) -> bool {
        if self.queues.in_chamber(id) || !self.queues.has_space() {
            return false;
        }

        let door_unlocked = if from_inside {
            !self.cycle.is_inner_door_locked()
        } else {
            !self.cycle.is_outer_door_locked()
        };
        let mut result = self.queues.transfer_in(id, from_inside, door_unlocked);

        if result && !from_inside {
            result = match lookup.resolve(id) {
                Some(handle) => host.ingress(&handle),
                None => {
                    log::warn!(
                        "occupant {id} could not be resolved for ingress at {}",
                        host.entity_name()
                    );
                    false
                }
            };
        }

        result
    }

    /// Moves an occupant out of the chamber.
    ///
    /// An occupant leaving to the outside is additionally handed to the
    /// host's `egress` hook after the chamber removal; its failure makes
    /// the call return false without undoing the removal.
    pub fn exit_airlock(
        &mut self,
        id: OccupantId,
        to_outside: bool,
        host: &dyn AirlockHost,
        lookup: &dyn OccupantLookup,
    ) -> bool {
        let mut result = false;

        if self.queues.in_chamber(id) {
            result = self.queues.transfer_out(id);
        }

        if result && to_outside {
            result = match lookup.resolve(id) {
                Some(handle) => host.egress(&handle),
                None => {
                    log::warn!(
                        "occupant {id} could not be resolved for egress at {}",
                        host.entity_name()
                    );
                    false
                }
            };
        }

        result
    }

    // ── Owner tick ──────────────────────────────────────────────────────

    /// Advances the airlock by `elapsed` millisols. Called once per pulse
    /// by the owning building or vehicle.
    ///
    /// While activated this consumes cycle time (when transitioning) and
    /// keeps the operator slot valid, re-electing whenever the incumbent
    /// has dropped out of the current candidate pool.
    pub fn time_passing(&mut self, elapsed: f64, lookup: &dyn OccupantLookup) {
        if !self.cycle.is_activated() {
            return;
        }

        if self.cycle.is_transitioning() {
            self.cycle.add_time(elapsed);
        }

        election::check_operator(&mut self.queues, lookup);
    }

    // ── Occupant removal ────────────────────────────────────────────────

    /// Purges an occupant from every set, the operator slot and the
    /// reservation board. Used when a person is removed from the
    /// simulation.
    pub fn remove_occupant(&mut self, id: OccupantId) {
        self.queues.remove_everywhere(id);
        self.reservations.cancel(id);
    }

    /// Purges the occupant if the resolver reports them dead or no longer
    /// knows the id at all.
    pub fn remove_deceased(&mut self, id: OccupantId, lookup: &dyn OccupantLookup) {
        match lookup.resolve(id) {
            Some(handle) if handle.alive => {}
            _ => self.remove_occupant(id),
        }
    }

    // ── Queue surface ───────────────────────────────────────────────────

    pub fn add_awaiting_inner(&mut self, id: OccupantId) -> bool {
        self.queues.add_awaiting_inner(id)
    }

    pub fn add_awaiting_outer(&mut self, id: OccupantId) -> bool {
        self.queues.add_awaiting_outer(id)
    }

    pub fn capacity(&self) -> usize {
        self.queues.capacity()
    }

    pub fn chamber_count(&self) -> usize {
        self.queues.chamber_count()
    }

    pub fn awaiting_inner_count(&self) -> usize {
        self.queues.awaiting_inner_count()
    }

    pub fn awaiting_outer_count(&self) -> usize {
        self.queues.awaiting_outer_count()
    }

    pub fn in_chamber(&self, id: OccupantId) -> bool {
        self.queues.in_chamber(id)
    }

    pub fn in_any_pool(&self, id: OccupantId) -> bool {
        self.queues.in_any_pool(id)
    }

    pub fn is_full(&self) -> bool {
        self.queues.is_full()
    }

    pub fn has_space(&self) -> bool {
        self.queues.has_space()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub fn queues(&self) -> &DoorQueues {
        &self.queues
    }

    // ── Operator surface ────────────────────────────────────────────────

    pub fn operator_id(&self) -> Option<OccupantId> {
        self.queues.operator_id()
    }

    pub fn is_operator(&self, id: OccupantId) -> bool {
        self.queues.operator_id() == Some(id)
    }

    pub fn release_operator(&mut self, id: OccupantId) {
        self.queues.release_operator(id);
    }

    /// Display name of the current operator, for diagnostics. "None" when
    /// the slot is empty, "N/A" when the id no longer resolves.
    pub fn operator_name(&self, lookup: &dyn OccupantLookup) -> String {
        match self.queues.operator_id() {
            None => "None".to_string(),
            Some(id) => match lookup.resolve(id) {
                Some(handle) => handle.name,
                None => "N/A".to_string(),
            },
        }
    }

    // ── Cycle surface ───────────────────────────────────────────────────

    pub fn state(&self) -> CycleState {
        self.cycle.state()
    }

    pub fn is_pressurized(&self) -> bool {
        self.cycle.is_pressurized()
    }

    pub fn is_depressurized(&self) -> bool {
        self.cycle.is_depressurized()
    }

    pub fn is_pressurizing(&self) -> bool {
        self.cycle.is_pressurizing()
    }

    pub fn is_depressurizing(&self) -> bool {
        self.cycle.is_depressurizing()
    }

    pub fn set_pressurizing(&mut self) -> bool {
        self.cycle.set_pressurizing()
    }

    pub fn set_depressurizing(&mut self) -> bool {
        self.cycle.set_depressurizing()
    }

    pub fn switch_to_steady_state(&mut self) -> bool {
        self.cycle.switch_to_steady_state()
    }

    pub fn is_activated(&self) -> bool {
        self.cycle.is_activated()
    }

    pub fn set_activated(&mut self, value: bool) {
        self.cycle.set_activated(value);
    }

    pub fn set_transitioning(&mut self, value: bool) {
        self.cycle.set_transitioning(value);
    }

    pub fn is_inner_door_locked(&self) -> bool {
        self.cycle.is_inner_door_locked()
    }

    pub fn is_outer_door_locked(&self) -> bool {
        self.cycle.is_outer_door_locked()
    }

    pub fn set_inner_door_locked(&mut self, locked: bool) {
        self.cycle.set_inner_door_locked(locked);
    }

    pub fn set_outer_door_locked(&mut self, locked: bool) {
        self.cycle.set_outer_door_locked(locked);
    }

    pub fn remaining_cycle_time(&self) -> f64 {
        self.cycle.remaining_cycle_time()
    }

    // ── Mode ────────────────────────────────────────────────────────────

    pub fn mode(&self) -> AirlockMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AirlockMode) {
        self.mode = mode;
    }

    // ── Reservations ────────────────────────────────────────────────────

    pub fn reserve(&mut self, id: OccupantId, now_msol: u32) -> bool {
        self.reservations.reserve(id, now_msol)
    }

    pub fn has_reservation(&mut self, id: OccupantId, now_msol: u32) -> bool {
        self.reservations.has_reservation(id, now_msol)
    }

    pub fn cancel_reservation(&mut self, id: OccupantId) -> bool {
        self.reservations.cancel(id)
    }

    pub fn reserved_count(&self) -> usize {
        self.reservations.reserved_count()
    }

    pub fn is_reservation_full(&self) -> bool {
        self.reservations.is_full()
    }

    // ── EVA-suit diagnostics ────────────────────────────────────────────

    /// Records one failed attempt to find an available EVA suit.
    pub fn record_suit_check_failure(&mut self) {
        self.suit_check_failures += 1;
    }

    pub fn reset_suit_checks(&mut self) {
        self.suit_check_failures = 0;
    }

    pub fn suit_check_failures(&self) -> u32 {
        self.suit_check_failures
    }

    /// Whether any chamber occupant currently wears no EVA suit.
    /// Unresolvable ids are treated as suitless — they cannot be verified.
    pub fn someone_lacks_suit(&self, lookup: &dyn OccupantLookup) -> bool {
        self.queues
            .chamber()
            .iter()
            .any(|&id| match lookup.resolve(id) {
                Some(handle) => !handle.wears_suit,
                None => true,
            })
    }
}
