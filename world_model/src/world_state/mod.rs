//! World state management - the mutable graph shared by every handler.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{Entity, EntityId};

/// Flag value types for global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// The complete state of the simulated world at any point in time.
///
/// Every dispatch call hands handlers a mutable reference to this graph;
/// execution is single-threaded and turn-synchronous, so handlers mutate
/// freely and complete their mutation before returning. Entity insertion
/// order is tracked so per-entity turn sweeps are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldState {
    /// Completed turn count.
    turn: u64,

    /// All entities in the world.
    entities: HashMap<EntityId, Entity>,

    /// Entity insertion order.
    order: Vec<EntityId>,

    /// Global flags and variables.
    global_flags: HashMap<String, FlagValue>,
}

impl WorldState {
    /// Create a new empty world state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the world, returning its id.
    ///
    /// Adding an entity under an existing id replaces it in place.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id.clone();
        if self.entities.insert(id.clone(), entity).is_none() {
            self.order.push(id.clone());
        }
        id
    }

    /// Remove an entity from the world.
    pub fn remove_entity(&mut self, id: &EntityId) -> Option<Entity> {
        let removed = self.entities.remove(id);
        if removed.is_some() {
            self.order.retain(|e| e != id);
        }
        removed
    }

    /// Get entity by ID.
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Get mutable entity by ID.
    pub fn entity_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Check whether an entity exists.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Entity ids in insertion order.
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    /// The number of entities in the world.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All entities with a given behavior module attached, in insertion
    /// order.
    pub fn entities_with_behavior(&self, path: &str) -> Vec<&Entity> {
        self.order
            .iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|e| e.has_behavior(path))
            .collect()
    }

    /// Get a global flag.
    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.global_flags.get(key)
    }

    /// Set a global flag.
    pub fn set_flag(&mut self, key: impl Into<String>, value: FlagValue) {
        self.global_flags.insert(key.into(), value);
    }

    /// The completed turn count.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Advance to the next turn.
    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }
}
