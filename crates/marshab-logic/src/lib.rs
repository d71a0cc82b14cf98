//! Pure airlock coordination logic for MarsHab.
//!
//! This crate contains the settlement simulation's airlock coordinator:
//! the component that lets a bounded number of settlers move between a
//! pressurized interior and the Martian surface through a two-door chamber,
//! while an elected operator drives the pressurize/depressurize cycle.
//!
//! Everything here is plain data and synchronous calls — no database, no
//! engine, no clocks. The owning building or vehicle drives the airlock one
//! pulse at a time and supplies its location-specific behavior through the
//! [`airlock::AirlockHost`] trait; settler records are resolved on demand
//! through [`occupant::OccupantLookup`] and never owned by the airlock.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`airlock`] | Aggregate root: transfer protocol, owner tick, host trait |
//! | [`cycle`] | Four-state pressurization machine, door locks, countdown |
//! | [`election`] | Operator pool priority and skill-based election |
//! | [`occupant`] | Occupant ids, lazily-resolved handles, lookup trait |
//! | [`queue`] | Bounded door queues and chamber occupancy bookkeeping |
//! | [`reservation`] | Bounded reservation board with millisol expiry |

pub mod airlock;
pub mod cycle;
pub mod election;
pub mod occupant;
pub mod queue;
pub mod reservation;
