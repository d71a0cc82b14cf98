//! Door queues and chamber occupancy bookkeeping.
//!
//! Three bounded id sets track everyone the airlock currently accounts for:
//! the chamber itself (bounded by the chamber capacity) and one waiting set
//! per door (bounded by [`queue_constants::MAX_WAITING_SLOTS`]). Membership
//! is unique; insertion order carries no meaning — ties between occupants
//! are broken by skill, not arrival (see [`crate::election`]).
//!
//! Sets are `BTreeSet`s so that iteration order — and therefore the
//! fallback winner of a fully-tied operator election — is deterministic for
//! identical inputs.
//!
//! Capacity and slot exhaustion are routine `false` results, not errors.
//! Finding an id still present in a waiting set immediately after its own
//! removal is corruption, and panics.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::occupant::OccupantId;

/// Queue constants.
pub mod queue_constants {
    /// Maximum occupants waiting at each door.
    pub const MAX_WAITING_SLOTS: usize = 4;
}

/// Occupancy bookkeeping: the chamber set, the two waiting sets, and the
/// current operator id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorQueues {
    capacity: usize,
    chamber: BTreeSet<OccupantId>,
    awaiting_inner: BTreeSet<OccupantId>,
    awaiting_outer: BTreeSet<OccupantId>,
    operator_id: Option<OccupantId>,
}

impl DoorQueues {
    /// Creates empty queues for a chamber of the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero — a zero-person airlock is a
    /// construction error, not a domain state.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "airlock capacity must be at least 1");
        Self {
            capacity,
            chamber: BTreeSet::new(),
            awaiting_inner: BTreeSet::new(),
            awaiting_outer: BTreeSet::new(),
            operator_id: None,
        }
    }

    // ── Waiting-set inserts ─────────────────────────────────────────────

    /// Queues an occupant at the inner door. Idempotent: returns true when
    /// the id is already queued; false only when the set is full and the id
    /// is absent.
    pub fn add_awaiting_inner(&mut self, id: OccupantId) -> bool {
        Self::add_bounded(&mut self.awaiting_inner, id)
    }

    /// Queues an occupant at the outer door. Same contract as
    /// [`Self::add_awaiting_inner`].
    pub fn add_awaiting_outer(&mut self, id: OccupantId) -> bool {
        Self::add_bounded(&mut self.awaiting_outer, id)
    }

    fn add_bounded(set: &mut BTreeSet<OccupantId>, id: OccupantId) -> bool {
        if set.contains(&id) {
            return true;
        }
        if set.len() < queue_constants::MAX_WAITING_SLOTS {
            set.insert(id);
            return true;
        }
        false
    }

    // ── Transfers ───────────────────────────────────────────────────────

    /// Moves an occupant from the waiting set on the given side into the
    /// chamber.
    ///
    /// Succeeds only when `door_unlocked` is true for the corresponding
    /// door and the chamber is below capacity. On success the id is removed
    /// from the waiting set unconditionally (waiting there beforehand is
    /// not required).
    ///
    /// # Panics
    ///
    /// Panics if the id is still found in the waiting set immediately after
    /// its removal — that indicates concurrent corruption of the set and
    /// must not be ignored.
    pub fn transfer_in(&mut self, id: OccupantId, from_inside: bool, door_unlocked: bool) -> bool {
        if !door_unlocked || self.chamber.len() >= self.capacity {
            return false;
        }

        let waiting = if from_inside {
            &mut self.awaiting_inner
        } else {
            &mut self.awaiting_outer
        };
        waiting.remove(&id);
        assert!(
            !waiting.contains(&id),
            "occupant {id} still waiting at the {} door after removal",
            if from_inside { "inner" } else { "outer" }
        );

        self.chamber.insert(id);
        log::debug!(
            "occupant {id} transferred in through the {} door",
            if from_inside { "inner" } else { "outer" }
        );
        true
    }

    /// Removes an occupant from the chamber, releasing the operator role if
    /// they held it. Returns whether a removal occurred.
    pub fn transfer_out(&mut self, id: OccupantId) -> bool {
        if self.operator_id == Some(id) {
            self.operator_id = None;
        }
        self.chamber.remove(&id)
    }

    /// Purges an occupant from every set and from the operator slot.
    /// Used when a person dies or is removed from the simulation.
    pub fn remove_everywhere(&mut self, id: OccupantId) {
        if self.operator_id == Some(id) {
            self.operator_id = None;
        }
        self.chamber.remove(&id);
        self.awaiting_inner.remove(&id);
        self.awaiting_outer.remove(&id);
    }

    // ── Operator slot ───────────────────────────────────────────────────

    pub fn operator_id(&self) -> Option<OccupantId> {
        self.operator_id
    }

    /// Installs an operator. The id must belong to one of the three sets.
    ///
    /// # Panics
    ///
    /// Panics when the id is outside every occupancy pool — an operator
    /// pointing at nobody is corrupted state.
    pub fn set_operator(&mut self, id: OccupantId) {
        assert!(
            self.in_any_pool(id),
            "operator {id} is not in the chamber or either waiting set"
        );
        self.operator_id = Some(id);
    }

    /// Releases the operator role if the given occupant holds it.
    pub fn release_operator(&mut self, id: OccupantId) {
        if self.operator_id == Some(id) {
            self.operator_id = None;
        }
    }

    // ── Queries (side-effect free) ──────────────────────────────────────

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn chamber(&self) -> &BTreeSet<OccupantId> {
        &self.chamber
    }

    pub fn awaiting_inner(&self) -> &BTreeSet<OccupantId> {
        &self.awaiting_inner
    }

    pub fn awaiting_outer(&self) -> &BTreeSet<OccupantId> {
        &self.awaiting_outer
    }

    pub fn in_chamber(&self, id: OccupantId) -> bool {
        self.chamber.contains(&id)
    }

    /// Whether the id is anywhere the airlock accounts for it.
    pub fn in_any_pool(&self, id: OccupantId) -> bool {
        self.chamber.contains(&id)
            || self.awaiting_inner.contains(&id)
            || self.awaiting_outer.contains(&id)
    }

    pub fn chamber_count(&self) -> usize {
        self.chamber.len()
    }

    pub fn awaiting_inner_count(&self) -> usize {
        self.awaiting_inner.len()
    }

    pub fn awaiting_outer_count(&self) -> usize {
        self.awaiting_outer.len()
    }

    pub fn is_full(&self) -> bool {
        self.chamber.len() >= self.capacity
    }

    pub fn has_space(&self) -> bool {
        self.chamber.len() < self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.chamber.is_empty()
    }

    /// Chamber slots still open.
    pub fn spare_slots(&self) -> usize {
        self.capacity - self.chamber.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "capacity")]
    fn test_zero_capacity_rejected() {
        DoorQueues::new(0);
    }

    #[test]
    fn test_waiting_set_bounded_at_four() {
        let mut q = DoorQueues::new(2);
        for id in 1..=4 {
            assert!(q.add_awaiting_outer(id), "slot {id} should fit");
        }
        assert!(!q.add_awaiting_outer(5), "fifth waiter must be rejected");
        assert_eq!(q.awaiting_outer_count(), 4);
    }

    #[test]
    fn test_add_is_idempotent_even_when_full() {
        let mut q = DoorQueues::new(2);
        for id in 1..=4 {
            q.add_awaiting_inner(id);
        }
        // Already present — idempotent success despite the set being full
        assert!(q.add_awaiting_inner(3));
        assert_eq!(q.awaiting_inner_count(), 4);
    }

    #[test]
    fn test_transfer_in_requires_unlocked_door() {
        let mut q = DoorQueues::new(2);
        q.add_awaiting_outer(1);
        assert!(!q.transfer_in(1, false, false), "locked door blocks transfer");
        assert!(q.awaiting_outer().contains(&1), "waiter stays queued");
        assert!(q.transfer_in(1, false, true));
        assert!(q.in_chamber(1));
        assert!(!q.awaiting_outer().contains(&1));
    }

    #[test]
    fn test_transfer_in_respects_capacity() {
        let mut q = DoorQueues::new(2);
        q.add_awaiting_outer(1);
        q.add_awaiting_outer(2);
        q.add_awaiting_outer(3);
        assert!(q.transfer_in(1, false, true));
        assert!(q.transfer_in(2, false, true));
        assert_eq!(q.chamber_count(), 2);
        assert!(!q.transfer_in(3, false, true), "chamber full");
        assert!(q.awaiting_outer().contains(&3), "rejected waiter stays queued");
    }

    #[test]
    fn test_transfer_in_without_prior_wait_succeeds() {
        let mut q = DoorQueues::new(1);
        assert!(q.transfer_in(9, true, true));
        assert!(q.in_chamber(9));
    }

    #[test]
    fn test_transfer_out_clears_operator() {
        let mut q = DoorQueues::new(2);
        q.transfer_in(5, true, true);
        q.set_operator(5);
        assert!(q.transfer_out(5));
        assert_eq!(q.operator_id(), None);
        assert!(!q.transfer_out(5), "second removal reports false");
    }

    #[test]
    fn test_remove_everywhere_round_trip() {
        let mut q = DoorQueues::new(2);
        let before = q.clone();
        q.add_awaiting_outer(8);
        q.remove_everywhere(8);
        assert_eq!(q.chamber(), before.chamber());
        assert_eq!(q.awaiting_inner(), before.awaiting_inner());
        assert_eq!(q.awaiting_outer(), before.awaiting_outer());
        assert_eq!(q.operator_id(), before.operator_id());
    }

    #[test]
    #[should_panic(expected = "not in the chamber")]
    fn test_operator_outside_pools_panics() {
        let mut q = DoorQueues::new(2);
        q.set_operator(42);
    }

    #[test]
    fn test_spare_slots() {
        let mut q = DoorQueues::new(3);
        assert_eq!(q.spare_slots(), 3);
        q.transfer_in(1, true, true);
        assert_eq!(q.spare_slots(), 2);
        assert!(q.has_space());
        assert!(!q.is_empty());
    }
}
