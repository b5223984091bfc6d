use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An operation parameter, kept exactly as declared.
///
/// Registration only guarantees that `name` and `in` are present; their
/// values and every other key pass through untouched and in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameter(pub IndexMap<String, Value>);

impl Parameter {
    /// The declared `name`, when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The declared `in`, when it is a string.
    pub fn location(&self) -> Option<&str> {
        self.0.get("in").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn schema(&self) -> Option<&Value> {
        self.0.get("schema")
    }

    pub fn schema_mut(&mut self) -> Option<&mut Value> {
        self.0.get_mut("schema")
    }
}
