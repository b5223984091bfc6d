use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::parameter::Parameter;
use super::request_body::RequestBody;
use super::response::Response;
use super::security::SecurityRequirement;

/// An API operation, documenting one (path, method) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "operationId", default)]
    pub operation_id: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

/// Operations of one path, keyed by lower-case HTTP method.
pub type PathItem = IndexMap<String, Operation>;
