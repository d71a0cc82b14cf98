//! Occupant identity and lazily-resolved lookup.
//!
//! The airlock never owns a person record. It stores bare [`OccupantId`]s as
//! durable state and resolves a live [`OccupantHandle`] through an injected
//! [`OccupantLookup`] at the moment an operation needs skill levels, suit
//! status or a display name. Handles are views over the resolver's current
//! data and must not be cached across operations — after a save/restore the
//! ids are the only thing that survives.

use serde::{Deserialize, Serialize};

/// A settler's stable identifier within the simulation.
pub type OccupantId = u32;

/// A placement coordinate handed out by host position queries.
///
/// Opaque to the airlock logic — it is produced and consumed by the owning
/// building/vehicle for pathing and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A live, single-operation view of a person record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupantHandle {
    pub id: OccupantId,
    /// Display name, for logging only.
    pub name: String,
    /// EVA-operations skill level.
    pub eva_skill_level: u32,
    /// Accumulated experience points in the EVA-operations skill.
    pub eva_experience: u32,
    /// False once the person has died; dead occupants are purged from
    /// the airlock rather than transferred.
    pub alive: bool,
    /// Whether the person currently wears an EVA suit.
    pub wears_suit: bool,
}

/// Resolves an occupant id to a live handle.
///
/// Supplied at call time by the owner of the airlock; the airlock keeps no
/// reference to the resolver between operations.
pub trait OccupantLookup {
    /// Returns `None` when the id is unknown to the simulation (e.g. the
    /// person was purged while their id was still queued here).
    fn resolve(&self, id: OccupantId) -> Option<OccupantHandle>;
}

/// Simple in-memory registry, used by unit tests and the simtest harness.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryRegistry {
    people: Vec<OccupantHandle>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a person with the given EVA skill level and experience.
    pub fn add(&mut self, id: OccupantId, name: &str, eva_skill_level: u32, eva_experience: u32) {
        self.people.push(OccupantHandle {
            id,
            name: name.to_string(),
            eva_skill_level,
            eva_experience,
            alive: true,
            wears_suit: false,
        });
    }

    /// Marks a registered person as wearing (or not wearing) an EVA suit.
    pub fn set_suit(&mut self, id: OccupantId, wears_suit: bool) {
        if let Some(p) = self.people.iter_mut().find(|p| p.id == id) {
            p.wears_suit = wears_suit;
        }
    }

    /// Marks a registered person as dead.
    pub fn mark_dead(&mut self, id: OccupantId) {
        if let Some(p) = self.people.iter_mut().find(|p| p.id == id) {
            p.alive = false;
        }
    }

    /// Removes a person from the registry entirely.
    pub fn purge(&mut self, id: OccupantId) {
        self.people.retain(|p| p.id != id);
    }
}

impl OccupantLookup for MemoryRegistry {
    fn resolve(&self, id: OccupantId) -> Option<OccupantHandle> {
        self.people.iter().find(|p| p.id == id).cloned()
    }
}
