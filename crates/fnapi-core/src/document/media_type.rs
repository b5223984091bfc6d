use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const APPLICATION_JSON: &str = "application/json";

/// A media type object, kept exactly as declared. Keys besides `schema`
/// (`example`, `examples`, `encoding`, ...) pass through in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaType(pub IndexMap<String, Value>);

impl MediaType {
    pub fn with_schema(schema: Value) -> Self {
        let mut fields = IndexMap::new();
        fields.insert("schema".to_string(), schema);
        Self(fields)
    }

    pub fn schema(&self) -> Option<&Value> {
        self.0.get("schema")
    }

    pub fn schema_mut(&mut self) -> Option<&mut Value> {
        self.0.get_mut("schema")
    }

    /// A single-entry content map: `{"application/json": {"schema": ...}}`.
    pub fn json_content(schema: Value) -> IndexMap<String, MediaType> {
        let mut content = IndexMap::new();
        content.insert(APPLICATION_JSON.to_string(), MediaType::with_schema(schema));
        content
    }
}
