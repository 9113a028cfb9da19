//! Event context — the keyword-argument bundle fired alongside each event.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contextual parameters for one firing of a lifecycle event.
///
/// The shape of the bundle is event-defined and opaque to plugins beyond
/// name-based lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    /// Arbitrary event parameters keyed by name.
    pub kwargs: HashMap<String, Value>,
}

impl EventContext {
    /// Creates an empty event context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a typed parameter value.
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.kwargs.insert(key.to_string(), value);
        self
    }

    /// Inserts a string parameter.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.with_data(key, serde_json::json!(value))
    }

    /// Inserts an integer parameter.
    pub fn with_int(self, key: &str, value: i64) -> Self {
        self.with_data(key, serde_json::json!(value))
    }

    /// Inserts a boolean parameter.
    pub fn with_bool(self, key: &str, value: bool) -> Self {
        self.with_data(key, serde_json::json!(value))
    }

    /// Gets a parameter value by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    /// Gets a string parameter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.kwargs.get(key).and_then(|v| v.as_str())
    }

    /// Returns whether the context carries no parameters.
    pub fn is_empty(&self) -> bool {
        self.kwargs.is_empty()
    }
}
