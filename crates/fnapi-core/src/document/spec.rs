use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::operation::PathItem;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    pub version: String,

    #[serde(default)]
    pub description: String,

    /// OpenAPI 3.1 only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A compiled OpenAPI 3.0/3.1 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,

    pub info: Info,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiDocument {
    /// Look up the operation documented for `path` and `method`.
    pub fn operation(&self, path: &str, method: &str) -> Option<&super::Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }

    /// Look up a named schema in `components.schemas`.
    pub fn schema(&self, name: &str) -> Option<&serde_json::Value> {
        self.components.as_ref().and_then(|c| c.schemas.get(name))
    }
}
