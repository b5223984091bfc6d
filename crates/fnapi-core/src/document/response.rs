use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::MediaType;

/// A response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

impl Response {
    /// A response whose body is `schema` encoded as `application/json`.
    pub fn json(description: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            description: description.into(),
            content: Some(MediaType::json_content(schema)),
        }
    }
}
