//! Handler declarations read from a YAML or JSON file.
//!
//! ```yaml
//! handlers:
//!   - name: create_todo
//!     route: /todos
//!     method: post
//!     tags: [todos]
//!     request_model:
//!       name: TodoCreate
//!       schema: {type: object, properties: {title: {type: string}}}
//!     responses:
//!       "201": {description: Created}
//! ```
//!
//! Status codes should be quoted so they load as strings.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::document::SecurityRequirement;
use crate::error::ManifestError;
use crate::metadata::{HandlerMetadataBuilder, openapi};
use crate::model::{ModelType, StaticModel};
use crate::registry::Registry;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub handlers: Vec<HandlerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerEntry {
    pub name: String,
    /// Stable identity; defaults to `name`.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
    #[serde(default)]
    pub request_body: Option<Value>,
    #[serde(default)]
    pub request_model: Option<ModelEntry>,
    #[serde(default)]
    pub responses: IndexMap<String, Value>,
    #[serde(default)]
    pub response_model: Option<ModelEntry>,
}

/// A model given as its name and a JSON-schema dump.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntry {
    pub name: String,
    pub schema: Value,
}

impl ModelEntry {
    fn to_model(&self) -> Arc<dyn ModelType> {
        Arc::new(StaticModel::new(self.name.clone(), self.schema.clone()))
    }
}

impl HandlerEntry {
    /// A builder carrying this entry's declarations.
    pub fn builder(&self) -> HandlerMetadataBuilder {
        let mut builder = openapi()
            .name(self.name.clone())
            .summary(self.summary.clone())
            .description(self.description.clone())
            .tags(self.tags.iter().cloned())
            .parameters(self.parameters.iter().cloned());

        if let Some(id) = &self.id {
            builder = builder.handler_id(id.clone());
        }
        if let Some(operation_id) = &self.operation_id {
            builder = builder.operation_id(operation_id.clone());
        }
        if let Some(route) = &self.route {
            builder = builder.route(route.clone());
        }
        if let Some(method) = &self.method {
            builder = builder.method(method.clone());
        }
        for requirement in &self.security {
            builder = builder.security_requirement(requirement.clone());
        }
        if let Some(body) = &self.request_body {
            builder = builder.request_body(body.clone());
        }
        if let Some(model) = &self.request_model {
            builder = builder.request_model(model.to_model());
        }
        for (status, detail) in &self.responses {
            builder = builder.response(status, detail.clone());
        }
        if let Some(model) = &self.response_model {
            builder = builder.response_model(model.to_model());
        }
        builder
    }
}

impl Manifest {
    pub fn from_yaml(input: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml_ng::from_str(input)?)
    }

    pub fn from_json(input: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Validate and register every handler. Stops at the first invalid entry;
    /// entries before it stay registered.
    pub fn register_into(&self, registry: &Registry) -> Result<usize, ManifestError> {
        for entry in &self.handlers {
            entry.builder().register(registry)?;
        }
        log::debug!("registered {} handlers from manifest", self.handlers.len());
        Ok(self.handlers.len())
    }
}
