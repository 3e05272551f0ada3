//! Entity records: an ordered behavior list plus a property bag.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{EntityId, EntityKind};

/// Property key suffix naming a per-entity handler override.
///
/// An entity carrying `on_ignite_handler = "demo/burning::ignite"` routes
/// the `on_ignite` event to that external function instead of the default
/// module handling.
pub const HANDLER_OVERRIDE_SUFFIX: &str = "_handler";

/// A game object: an ordered list of attached behavior modules plus a
/// string-keyed, dynamically typed property bag.
///
/// The `behaviors` order determines handler precedence when several
/// attached modules implement the same event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,

    /// Module paths attached to this entity, in precedence order.
    #[serde(default)]
    pub behaviors: Vec<String>,

    /// Properties read and written by behavior handlers.
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

impl Entity {
    /// Create a new entity with no behaviors or properties.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            behaviors: Vec::new(),
            properties: HashMap::new(),
        }
    }

    /// Attach a behavior module path.
    pub fn with_behavior(mut self, path: impl Into<String>) -> Self {
        self.behaviors.push(path.into());
        self
    }

    /// Set a property value.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Check whether a behavior module is attached.
    pub fn has_behavior(&self, path: &str) -> bool {
        self.behaviors.iter().any(|p| p == path)
    }

    /// Check whether a property is present.
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Get a property value.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Get a boolean property.
    pub fn property_bool(&self, key: &str) -> Option<bool> {
        self.property(key).and_then(Value::as_bool)
    }

    /// Get an integer property.
    pub fn property_i64(&self, key: &str) -> Option<i64> {
        self.property(key).and_then(Value::as_i64)
    }

    /// Get a float property.
    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(Value::as_f64)
    }

    /// Get a string property.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }

    /// Set a property value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Remove a property, returning its previous value.
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// The handler override reference for an event, if this entity
    /// carries the reserved `<event>_handler` property.
    pub fn handler_override(&self, event: &str) -> Option<&str> {
        self.properties
            .get(&format!("{}{}", event, HANDLER_OVERRIDE_SUFFIX))
            .and_then(Value::as_str)
    }
}
