use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Components object holding the shared schema table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, serde_json::Value>,
}
