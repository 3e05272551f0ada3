//! The auxiliary context payload handed to every handler call.

use serde_json::Value;
use std::collections::HashMap;

/// Auxiliary key/value data accompanying one dispatch call.
///
/// The context is the explicit carrier for call-specific detail (damage
/// amounts, the acting entity, the verb that triggered the event); there
/// is no ambient state. Handlers read it immutably and put their own
/// output in the result's context map.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    values: HashMap<String, Value>,
}

impl EventContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a context entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a context value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a string context value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get an integer context value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Get a float context value.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Get a boolean context value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The number of context entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder_and_typed_getters() {
        let ctx = EventContext::new()
            .with("amount", 5)
            .with("element", "fire")
            .with("critical", true);

        assert_eq!(ctx.get_i64("amount"), Some(5));
        assert_eq!(ctx.get_str("element"), Some("fire"));
        assert_eq!(ctx.get_bool("critical"), Some(true));
        assert_eq!(ctx.get_i64("element"), None);
        assert!(ctx.contains("amount"));
        assert!(!ctx.contains("missing"));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_empty_context() {
        let ctx = EventContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get("anything"), None);
    }
}
