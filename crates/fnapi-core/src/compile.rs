use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::document::{Components, Info, MediaType, OpenApiDocument, Operation, RequestBody, Response};
use crate::error::{CompileError, HandlerFault};
use crate::metadata::{DEFAULT_TAG, HandlerMetadata};
use crate::model::ModelType;
use crate::registry::MetadataSource;
use crate::transform::components::ComponentsTable;
use crate::transform::upgrade;

/// Fixed `info.description` of every compiled document.
pub const INFO_DESCRIPTION: &str =
    "Auto-generated OpenAPI documentation. Markdown supported in descriptions (CommonMark).";

/// Description of the `200` response generated from a response model.
pub const SUCCESSFUL_RESPONSE: &str = "Successful Response";

const DEFAULT_METHOD: &str = "get";

/// Methods whose operations may carry a request body.
const BODY_METHODS: [&str; 3] = ["post", "put", "patch"];

/// Supported output dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpecVersion {
    #[default]
    V3_0,
    V3_1,
}

impl SpecVersion {
    pub const SUPPORTED: [&'static str; 2] = ["3.0.0", "3.1.0"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V3_0 => "3.0.0",
            Self::V3_1 => "3.1.0",
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3.0.0" => Ok(Self::V3_0),
            "3.1.0" => Ok(Self::V3_1),
            other => Err(CompileError::UnsupportedVersion {
                version: other.to_string(),
                supported: Self::SUPPORTED.to_vec(),
            }),
        }
    }
}

impl TryFrom<String> for SpecVersion {
    type Error = CompileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SpecVersion> for String {
    fn from(version: SpecVersion) -> Self {
        version.as_str().to_string()
    }
}

/// Document-level compilation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompileOptions {
    pub title: String,
    pub version: String,
    pub spec_version: SpecVersion,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "1.0.0".to_string(),
            spec_version: SpecVersion::V3_0,
        }
    }
}

impl CompileOptions {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn spec_version(mut self, spec_version: SpecVersion) -> Self {
        self.spec_version = spec_version;
        self
    }
}

/// Compile the metadata in `source` into an OpenAPI document.
///
/// Handlers are processed in registration order. A handler whose metadata
/// cannot be turned into an operation is logged and left out; it never
/// fails the document. A model that cannot describe itself falls back to a
/// plain object schema.
pub fn compile(
    source: &impl MetadataSource,
    options: &CompileOptions,
) -> Result<OpenApiDocument, CompileError> {
    let handlers = source.snapshot()?;
    let mut components = ComponentsTable::new();
    let mut paths: IndexMap<String, IndexMap<String, Operation>> = IndexMap::new();
    let mut documented = 0usize;

    for (key, meta) in &handlers {
        match compile_handler(key, meta, &mut components) {
            Ok((path, method, operation)) => {
                // Last registration wins, keeping the slot of the first.
                paths.entry(path).or_default().insert(method, operation);
                documented += 1;
            }
            Err(err) => {
                log::error!("failed to generate OpenAPI operation for handler '{key}': {err}");
            }
        }
    }

    let mut doc = OpenApiDocument {
        openapi: SpecVersion::V3_0.as_str().to_string(),
        info: Info {
            title: options.title.clone(),
            version: options.version.clone(),
            description: INFO_DESCRIPTION.to_string(),
            summary: None,
        },
        paths,
        components: (!components.is_empty()).then(|| Components {
            schemas: components.into_schemas(),
        }),
    };

    if options.spec_version == SpecVersion::V3_1 {
        upgrade::upgrade_in_place(&mut doc);
    }

    log::info!(
        "generated OpenAPI {} document: {} of {} handlers across {} paths",
        options.spec_version,
        documented,
        handlers.len(),
        doc.paths.len()
    );
    Ok(doc)
}

/// Convenience wrapper taking the target version as a string.
pub fn generate(
    source: &impl MetadataSource,
    title: &str,
    version: &str,
    spec_version: &str,
) -> Result<OpenApiDocument, CompileError> {
    let options = CompileOptions::new(title, version).spec_version(spec_version.parse()?);
    compile(source, &options)
}

/// Turn one registry entry into `(path, method, operation)`.
///
/// Declared responses are checked before any model touches the component
/// table, so a skipped handler leaves no schemas behind.
fn compile_handler(
    key: &str,
    meta: &HandlerMetadata,
    components: &mut ComponentsTable,
) -> Result<(String, String, Operation), HandlerFault> {
    let path = meta.route.clone().unwrap_or_else(|| format!("/{key}"));
    let method = meta
        .method
        .as_deref()
        .unwrap_or(DEFAULT_METHOD)
        .to_ascii_lowercase();

    let mut responses = declared_responses(&meta.responses)?;

    if let Some(model) = meta.response_model.as_deref() {
        let schema = model_schema(key, model, components);
        responses.insert("200".to_string(), Response::json(SUCCESSFUL_RESPONSE, schema));
    }

    let request_body = if BODY_METHODS.contains(&method.as_str()) {
        match (&meta.request_body, meta.request_model.as_deref()) {
            (Some(body), _) => Some(RequestBody::json(body.clone())),
            (None, Some(model)) => Some(RequestBody::json(model_schema(key, model, components))),
            (None, None) => None,
        }
    } else {
        None
    };

    let tags = if meta.tags.is_empty() {
        vec![DEFAULT_TAG.to_string()]
    } else {
        meta.tags.clone()
    };

    let operation = Operation {
        summary: meta.summary.clone(),
        description: meta.description.clone(),
        operation_id: meta
            .operation_id
            .clone()
            .unwrap_or_else(|| format!("{method}_{key}")),
        tags,
        responses,
        parameters: meta.parameters.clone(),
        request_body,
        security: meta.security.clone(),
    };
    Ok((path, method, operation))
}

fn declared_responses(
    declared: &IndexMap<String, Value>,
) -> Result<IndexMap<String, Response>, HandlerFault> {
    let mut responses = IndexMap::new();
    for (status, detail) in declared {
        let Value::Object(detail) = detail else {
            return Err(HandlerFault::ResponseNotObject {
                status: status.clone(),
            });
        };
        let description = detail
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let content = match detail.get("content") {
            Some(content) => Some(
                serde_json::from_value::<IndexMap<String, MediaType>>(content.clone()).map_err(
                    |source| HandlerFault::ResponseContent {
                        status: status.clone(),
                        source,
                    },
                )?,
            ),
            None => None,
        };
        responses.insert(status.clone(), Response { description, content });
    }
    Ok(responses)
}

fn model_schema(key: &str, model: &dyn ModelType, components: &mut ComponentsTable) -> Value {
    match components.register_model(model) {
        Ok(reference) => reference,
        Err(err) => {
            log::warn!(
                "schema for model '{}' on handler '{key}' is unavailable, using a plain object: {err}",
                model.name()
            );
            json!({"type": "object"})
        }
    }
}
