use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::MediaType;

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,

    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    /// A required `application/json` body described by `schema`.
    pub fn json(schema: serde_json::Value) -> Self {
        Self {
            required: true,
            content: MediaType::json_content(schema),
        }
    }
}
