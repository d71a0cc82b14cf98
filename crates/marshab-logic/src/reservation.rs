//! Airlock reservation board.
//!
//! EVA tasks reserve a spot on an airlock before walking to it, so that at
//! most [`reservation_constants::MAX_RESERVED`] settlers converge on the
//! same chamber. A reservation goes stale after
//! [`reservation_constants::RESERVATION_PERIOD`] millisols and is dropped
//! lazily on the next query. The caller supplies the current millisol of
//! day; the board never reads a clock itself. The day wraps at 1000 msols.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::occupant::OccupantId;

/// Reservation constants.
pub mod reservation_constants {
    /// Maximum simultaneous reservations per airlock.
    pub const MAX_RESERVED: usize = 4;
    /// How long a reservation stays effective, in millisols.
    pub const RESERVATION_PERIOD: u32 = 40;
    /// Millisols in one sol.
    pub const MSOLS_PER_SOL: u32 = 1000;
}

/// Bounded map of occupant id to the millisol the reservation was made.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReservationBoard {
    slots: BTreeMap<OccupantId, u32>,
}

impl ReservationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Millisols elapsed since `then`, accounting for sol wraparound.
    fn elapsed(then: u32, now: u32) -> u32 {
        if then > now {
            now + reservation_constants::MSOLS_PER_SOL - then
        } else {
            now - then
        }
    }

    /// Reserves a slot for an occupant.
    ///
    /// A new id is accepted only while the board has room. A known id always
    /// returns true, and its timestamp refreshes once the reservation period
    /// has fully elapsed.
    pub fn reserve(&mut self, id: OccupantId, now_msol: u32) -> bool {
        match self.slots.get(&id).copied() {
            None => {
                if self.is_full() {
                    return false;
                }
                self.slots.insert(id, now_msol);
                true
            }
            Some(made) => {
                if Self::elapsed(made, now_msol) >= reservation_constants::RESERVATION_PERIOD {
                    self.slots.insert(id, now_msol);
                }
                true
            }
        }
    }

    /// Whether the occupant holds an unexpired reservation. Expired entries
    /// are removed as a side effect of asking.
    pub fn has_reservation(&mut self, id: OccupantId, now_msol: u32) -> bool {
        if let Some(made) = self.slots.get(&id).copied() {
            if Self::elapsed(made, now_msol) <= reservation_constants::RESERVATION_PERIOD {
                return true;
            }
            self.slots.remove(&id);
        }
        false
    }

    /// Drops an occupant's reservation. Returns whether one existed.
    pub fn cancel(&mut self, id: OccupantId) -> bool {
        self.slots.remove(&id).is_some()
    }

    pub fn reserved_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= reservation_constants::MAX_RESERVED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reservation_constants::*;

    #[test]
    fn test_reserve_up_to_limit() {
        let mut b = ReservationBoard::new();
        for id in 1..=4 {
            assert!(b.reserve(id, 100));
        }
        assert!(b.is_full());
        assert!(!b.reserve(5, 100), "fifth reservation rejected");
        assert_eq!(b.reserved_count(), 4);
    }

    #[test]
    fn test_known_id_always_accepted() {
        let mut b = ReservationBoard::new();
        for id in 1..=4 {
            b.reserve(id, 100);
        }
        assert!(b.reserve(2, 110), "existing holder is not turned away");
    }

    #[test]
    fn test_reservation_expires() {
        let mut b = ReservationBoard::new();
        b.reserve(1, 100);
        assert!(b.has_reservation(1, 100 + RESERVATION_PERIOD));
        assert!(!b.has_reservation(1, 101 + RESERVATION_PERIOD));
        assert_eq!(b.reserved_count(), 0, "expired entry dropped on query");
    }

    #[test]
    fn test_expiry_across_sol_wraparound() {
        let mut b = ReservationBoard::new();
        b.reserve(1, 990);
        // 990 → 20 is 30 msols elapsed across the sol boundary
        assert!(b.has_reservation(1, 20));
        // 990 → 35 is 45 msols — stale
        assert!(!b.has_reservation(1, 35));
    }

    #[test]
    fn test_stale_reservation_refreshes() {
        let mut b = ReservationBoard::new();
        b.reserve(1, 100);
        assert!(b.reserve(1, 100 + RESERVATION_PERIOD));
        // Refreshed at the later time, so still live well past the original
        assert!(b.has_reservation(1, 100 + RESERVATION_PERIOD + 30));
    }

    #[test]
    fn test_cancel() {
        let mut b = ReservationBoard::new();
        b.reserve(3, 50);
        assert!(b.cancel(3));
        assert!(!b.cancel(3));
        assert!(!b.has_reservation(3, 51));
    }
}
