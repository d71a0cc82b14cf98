//! Operator election.
//!
//! While a cycle is running, one occupant is notionally "driving" it. The
//! role is pure bookkeeping — it never gates a transition — but it must
//! always point at someone the airlock currently accounts for.
//!
//! The candidate pool is picked by priority: occupants inside the chamber
//! first, then the outer-door waiters, then the inner-door waiters. Within
//! the pool the highest EVA-operations skill level wins; ties fall back to
//! experience points in that skill; a full tie keeps the first candidate in
//! pool iteration order (ascending id, so the outcome is deterministic for
//! identical inputs). A singleton pool is elected without any comparison.

use std::collections::BTreeSet;

use crate::occupant::{OccupantId, OccupantLookup};
use crate::queue::DoorQueues;

/// Picks the candidate pool for the next election, by priority.
pub fn operator_pool(queues: &DoorQueues) -> &BTreeSet<OccupantId> {
    if !queues.chamber().is_empty() {
        queues.chamber()
    } else if !queues.awaiting_outer().is_empty() {
        queues.awaiting_outer()
    } else {
        queues.awaiting_inner()
    }
}

/// Elects the best candidate from a pool, or `None` for an empty pool.
///
/// Candidates the resolver no longer knows about are skipped; a singleton
/// pool wins unconditionally, whatever its skill value.
pub fn elect_operator(
    pool: &BTreeSet<OccupantId>,
    lookup: &dyn OccupantLookup,
) -> Option<OccupantId> {
    if pool.is_empty() {
        return None;
    }
    if pool.len() == 1 {
        let id = *pool.iter().next().unwrap();
        log::debug!("occupant {id} acted as the airlock operator");
        return Some(id);
    }

    let mut selected: Option<OccupantId> = None;
    let mut best_level: i64 = -1;
    let mut best_exp: i64 = -1;

    for &id in pool {
        let Some(handle) = lookup.resolve(id) else {
            continue;
        };
        let level = i64::from(handle.eva_skill_level);
        let exp = i64::from(handle.eva_experience);

        if level > best_level {
            selected = Some(id);
            best_level = level;
            best_exp = exp;
        } else if level == best_level && exp > best_exp {
            selected = Some(id);
            best_exp = exp;
        }
    }

    if let Some(id) = selected {
        log::debug!("occupant {id} stepped up becoming the airlock operator");
    }
    selected
}

/// Runs the election trigger: elects when no operator is set, or re-elects
/// when the current operator has dropped out of the currently-computed pool
/// (preferring whoever is now inside the chamber over those still queued).
///
/// Only meaningful while the airlock is activated; the caller gates on that.
pub fn check_operator(queues: &mut DoorQueues, lookup: &dyn OccupantLookup) {
    let needs_election = match queues.operator_id() {
        None => true,
        Some(current) => !operator_pool(queues).contains(&current),
    };
    if !needs_election {
        return;
    }

    let elected = elect_operator(operator_pool(queues), lookup);
    if let Some(id) = elected {
        // set_operator re-checks pool membership and panics on corruption
        queues.set_operator(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupant::MemoryRegistry;

    fn registry(people: &[(OccupantId, u32, u32)]) -> MemoryRegistry {
        let mut reg = MemoryRegistry::new();
        for &(id, level, exp) in people {
            reg.add(id, &format!("p{id}"), level, exp);
        }
        reg
    }

    #[test]
    fn test_pool_prefers_chamber() {
        let mut q = DoorQueues::new(2);
        q.add_awaiting_inner(1);
        q.add_awaiting_outer(2);
        q.transfer_in(3, true, true);
        assert!(operator_pool(&q).contains(&3));
        assert_eq!(operator_pool(&q).len(), 1);
    }

    #[test]
    fn test_pool_falls_back_outer_then_inner() {
        let mut q = DoorQueues::new(2);
        q.add_awaiting_inner(1);
        assert!(operator_pool(&q).contains(&1), "inner waiters are the last resort");
        q.add_awaiting_outer(2);
        assert!(operator_pool(&q).contains(&2), "outer waiters outrank inner");
    }

    #[test]
    fn test_singleton_pool_wins_with_zero_skill() {
        let reg = registry(&[(7, 0, 0)]);
        let mut pool = BTreeSet::new();
        pool.insert(7);
        assert_eq!(elect_operator(&pool, &reg), Some(7));
    }

    #[test]
    fn test_highest_skill_level_wins() {
        let reg = registry(&[(1, 2, 900), (2, 5, 0)]);
        let pool: BTreeSet<_> = [1, 2].into_iter().collect();
        assert_eq!(elect_operator(&pool, &reg), Some(2));
    }

    #[test]
    fn test_experience_breaks_level_tie() {
        let reg = registry(&[(1, 3, 50), (2, 3, 200)]);
        let pool: BTreeSet<_> = [1, 2].into_iter().collect();
        assert_eq!(elect_operator(&pool, &reg), Some(2));
    }

    #[test]
    fn test_full_tie_is_deterministic_first_candidate() {
        let reg = registry(&[(4, 3, 100), (9, 3, 100)]);
        let pool: BTreeSet<_> = [9, 4].into_iter().collect();
        // BTreeSet iterates ascending: 4 is encountered first and kept
        assert_eq!(elect_operator(&pool, &reg), Some(4));
    }

    #[test]
    fn test_unresolvable_candidates_skipped() {
        let reg = registry(&[(2, 1, 0)]);
        let pool: BTreeSet<_> = [1, 2].into_iter().collect();
        assert_eq!(elect_operator(&pool, &reg), Some(2));
    }

    #[test]
    fn test_empty_pool_elects_nobody() {
        let reg = registry(&[]);
        let pool = BTreeSet::new();
        assert_eq!(elect_operator(&pool, &reg), None);
    }

    #[test]
    fn test_check_operator_elects_when_unset() {
        let reg = registry(&[(1, 0, 0), (2, 4, 10)]);
        let mut q = DoorQueues::new(2);
        q.add_awaiting_outer(1);
        q.add_awaiting_outer(2);
        check_operator(&mut q, &reg);
        assert_eq!(q.operator_id(), Some(2));
    }

    #[test]
    fn test_check_operator_reelects_when_pool_moves_inside() {
        let reg = registry(&[(1, 0, 0), (2, 4, 10)]);
        let mut q = DoorQueues::new(2);
        q.add_awaiting_outer(1);
        q.add_awaiting_outer(2);
        check_operator(&mut q, &reg);
        assert_eq!(q.operator_id(), Some(2));

        // Occupant 1 steps into the chamber; the pool is now the chamber
        // and the old operator is no longer in it.
        q.transfer_in(1, false, true);
        check_operator(&mut q, &reg);
        assert_eq!(q.operator_id(), Some(1), "chamber occupant takes over");
    }

    #[test]
    fn test_check_operator_keeps_valid_incumbent() {
        let reg = registry(&[(1, 0, 0), (2, 4, 10)]);
        let mut q = DoorQueues::new(2);
        q.transfer_in(1, true, true);
        q.transfer_in(2, true, true);
        check_operator(&mut q, &reg);
        assert_eq!(q.operator_id(), Some(2));
        // Still in the pool — no re-election even though skill says 2 anyway
        check_operator(&mut q, &reg);
        assert_eq!(q.operator_id(), Some(2));
    }

    #[test]
    fn test_operator_always_in_pool_after_check() {
        let reg = registry(&[(1, 1, 1), (2, 2, 2), (3, 3, 3)]);
        let mut q = DoorQueues::new(2);
        q.add_awaiting_outer(1);
        q.add_awaiting_inner(2);
        q.transfer_in(3, true, true);
        check_operator(&mut q, &reg);
        let op = q.operator_id().expect("operator elected");
        assert!(operator_pool(&q).contains(&op));
    }
}
