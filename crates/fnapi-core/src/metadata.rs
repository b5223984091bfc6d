//! Handler documentation metadata and the builder that validates it.
//!
//! A handler and its documentation are two separate values joined by an
//! explicit call:
//!
//! ```
//! use fnapi_core::{openapi, Registry};
//!
//! fn greet(name: &str) -> String {
//!     format!("hello {name}")
//! }
//!
//! let registry = Registry::new();
//! let greet = openapi()
//!     .summary("Greet someone")
//!     .route("/greet")
//!     .attach(&registry, greet)
//!     .unwrap();
//! assert_eq!(greet("bob"), "hello bob");
//! assert!(registry.get_all().contains_key("greet"));
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::document::{Parameter, SecurityRequirement};
use crate::error::{RegistrationError, RegistrationErrorKind};
use crate::model::{ModelType, is_valid_component_name};
use crate::registry::Registry;
use crate::sanitize::{sanitize_operation_id, validate_route_path};

pub const DEFAULT_TAG: &str = "default";

/// Validated documentation metadata for one handler.
///
/// Only [`HandlerMetadataBuilder`] constructs these, so every instance has
/// passed registration validation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct HandlerMetadata {
    /// Registry key and default path segment.
    pub name: String,
    /// Module-qualified identity of the underlying handler.
    pub handler_id: String,
    pub summary: String,
    /// Markdown.
    pub description: String,
    /// Never empty.
    pub tags: Vec<String>,
    /// Already sanitized to `[A-Za-z][A-Za-z0-9_]*`.
    pub operation_id: Option<String>,
    pub route: Option<String>,
    pub method: Option<String>,
    pub parameters: Vec<Parameter>,
    pub security: Vec<SecurityRequirement>,
    /// Raw request body schema. Wins over `request_model`.
    pub request_body: Option<Value>,
    pub request_model: Option<Arc<dyn ModelType>>,
    /// Status code → response object (`description`, optional `content`).
    pub responses: IndexMap<String, Value>,
    /// Populates or overrides the `200` response.
    pub response_model: Option<Arc<dyn ModelType>>,
}

/// Start documenting a handler.
pub fn openapi() -> HandlerMetadataBuilder {
    HandlerMetadataBuilder::default()
}

/// Collects handler metadata and validates it on [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct HandlerMetadataBuilder {
    name: Option<String>,
    handler_id: Option<String>,
    summary: String,
    description: String,
    tags: Vec<String>,
    operation_id: Option<String>,
    route: Option<String>,
    method: Option<String>,
    parameters: Vec<Value>,
    security: Vec<SecurityRequirement>,
    request_body: Option<Value>,
    request_model: Option<Arc<dyn ModelType>>,
    responses: IndexMap<String, Value>,
    response_model: Option<Arc<dyn ModelType>>,
}

impl HandlerMetadataBuilder {
    /// Registry key. Derived from the handler's path when using
    /// [`attach`](Self::attach).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stable identity used to tell a re-registration of the same handler
    /// apart from a different handler reusing the name. Defaults to the name.
    pub fn handler_id(mut self, handler_id: impl Into<String>) -> Self {
        self.handler_id = Some(handler_id.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Add a parameter object. It must be a JSON object carrying `name` and `in`.
    pub fn parameter(mut self, parameter: Value) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameters<I>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.parameters.extend(parameters);
        self
    }

    /// Require `scheme` with the given scopes.
    pub fn security<I, S>(mut self, scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut requirement = SecurityRequirement::new();
        requirement.insert(scheme.into(), scopes.into_iter().map(Into::into).collect());
        self.security.push(requirement);
        self
    }

    pub fn security_requirement(mut self, requirement: SecurityRequirement) -> Self {
        self.security.push(requirement);
        self
    }

    pub fn request_body(mut self, schema: Value) -> Self {
        self.request_body = Some(schema);
        self
    }

    pub fn request_model(mut self, model: Arc<dyn ModelType>) -> Self {
        self.request_model = Some(model);
        self
    }

    /// Declare the response for `status` (e.g. `404` or `"default"`).
    pub fn response(mut self, status: impl ToString, detail: Value) -> Self {
        self.responses.insert(status.to_string(), detail);
        self
    }

    pub fn response_model(mut self, model: Arc<dyn ModelType>) -> Self {
        self.response_model = Some(model);
        self
    }

    /// Validate and produce the metadata. Nothing is registered on failure.
    pub fn build(self) -> Result<HandlerMetadata, RegistrationError> {
        let name = self.name.unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Err(RegistrationError::new(name, RegistrationErrorKind::EmptyName));
        }
        let fail = |kind| RegistrationError::new(name.clone(), kind);

        let route = match self.route.filter(|r| !r.is_empty()) {
            Some(route) if !validate_route_path(&route) => {
                return Err(fail(RegistrationErrorKind::InvalidRoute(route)));
            }
            route => route,
        };

        let operation_id = self.operation_id.filter(|id| !id.is_empty()).and_then(|id| {
            let sanitized = sanitize_operation_id(&id);
            if sanitized.is_empty() {
                log::warn!(
                    "operation id '{id}' for handler '{name}' has no usable characters; using the default"
                );
                None
            } else {
                Some(sanitized)
            }
        });

        let tags = validate_tags(self.tags).map_err(fail)?;
        let parameters = validate_parameters(self.parameters).map_err(fail)?;
        validate_security(&self.security).map_err(fail)?;

        if let Some(ref body) = self.request_body {
            if !body.is_object() {
                return Err(fail(RegistrationErrorKind::InvalidModel {
                    field: "request_body",
                    reason: "must be a JSON object".to_string(),
                }));
            }
        }
        validate_model("request_model", self.request_model.as_deref()).map_err(fail)?;
        validate_model("response_model", self.response_model.as_deref()).map_err(fail)?;

        let handler_id = self.handler_id.unwrap_or_else(|| name.clone());

        Ok(HandlerMetadata {
            name,
            handler_id,
            summary: self.summary,
            description: self.description,
            tags,
            operation_id,
            route,
            method: self.method,
            parameters,
            security: self.security,
            request_body: self.request_body,
            request_model: self.request_model,
            responses: self.responses,
            response_model: self.response_model,
        })
    }

    /// Validate and register into `registry`.
    pub fn register(self, registry: &Registry) -> Result<(), RegistrationError> {
        let metadata = self.build()?;
        let name = metadata.name.clone();
        registry.register(&name, metadata);
        Ok(())
    }

    /// Document `handler` and hand it back unchanged.
    ///
    /// The handler's type path (e.g. `my_app::routes::greet`) becomes its
    /// stable identifier, and its last segment the default name.
    pub fn attach<F>(mut self, registry: &Registry, handler: F) -> Result<F, RegistrationError> {
        let type_path = std::any::type_name::<F>();
        if self.name.is_none() {
            let last = type_path.rsplit("::").next().unwrap_or(type_path);
            // Closures have no usable name of their own.
            if !last.contains('{') {
                self.name = Some(last.to_string());
            }
        }
        if self.handler_id.is_none() {
            self.handler_id = Some(type_path.to_string());
        }
        self.register(registry)?;
        Ok(handler)
    }
}

fn validate_tags(tags: Vec<String>) -> Result<Vec<String>, RegistrationErrorKind> {
    if tags.is_empty() {
        return Ok(vec![DEFAULT_TAG.to_string()]);
    }
    tags.into_iter()
        .enumerate()
        .map(|(index, tag)| {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                Err(RegistrationErrorKind::InvalidTag {
                    index,
                    reason: "cannot be empty".to_string(),
                })
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

fn validate_parameters(parameters: Vec<Value>) -> Result<Vec<Parameter>, RegistrationErrorKind> {
    parameters
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let invalid = |reason: String| RegistrationErrorKind::InvalidParameter { index, reason };
            let object = raw
                .as_object()
                .ok_or_else(|| invalid("must be a JSON object".to_string()))?;
            for field in ["name", "in"] {
                if !object.contains_key(field) {
                    return Err(invalid(format!("missing required field: {field}")));
                }
            }
            Ok(Parameter(object.clone().into_iter().collect()))
        })
        .collect()
}

fn validate_security(security: &[SecurityRequirement]) -> Result<(), RegistrationErrorKind> {
    for (index, requirement) in security.iter().enumerate() {
        if requirement.keys().any(|scheme| scheme.trim().is_empty()) {
            return Err(RegistrationErrorKind::InvalidSecurity {
                index,
                reason: "has an empty scheme name".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_model(
    field: &'static str,
    model: Option<&dyn ModelType>,
) -> Result<(), RegistrationErrorKind> {
    match model {
        Some(model) if !is_valid_component_name(model.name()) => {
            Err(RegistrationErrorKind::InvalidModel {
                field,
                reason: format!("'{}' is not a valid component schema name", model.name()),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StaticModel;
    use serde_json::json;

    fn greet() -> &'static str {
        "hi"
    }

    #[test]
    fn defaults_tags_and_handler_id() {
        let meta = openapi().name("greet").build().unwrap();
        assert_eq!(meta.tags, vec!["default"]);
        assert_eq!(meta.handler_id, "greet");
        assert!(meta.route.is_none());
        assert!(meta.operation_id.is_none());
    }

    #[test]
    fn trims_tags_and_rejects_blank_ones() {
        let meta = openapi().name("a").tags([" Todo ", "Admin"]).build().unwrap();
        assert_eq!(meta.tags, vec!["Todo", "Admin"]);

        let err = openapi().name("a").tags(["ok", "  "]).build().unwrap_err();
        assert_eq!(err.handler, "a");
        assert_eq!(err.kind.field(), "tags");
    }

    #[test]
    fn rejects_unsafe_route() {
        let err = openapi().name("a").route("/x/../etc").build().unwrap_err();
        assert_eq!(
            err.kind,
            RegistrationErrorKind::InvalidRoute("/x/../etc".to_string())
        );
    }

    #[test]
    fn empty_route_means_no_route() {
        let meta = openapi().name("a").route("").build().unwrap();
        assert!(meta.route.is_none());
    }

    #[test]
    fn sanitizes_operation_id() {
        let meta = openapi().name("a").operation_id("get-todo!").build().unwrap();
        assert_eq!(meta.operation_id.as_deref(), Some("gettodo"));

        let meta = openapi().name("a").operation_id("42").build().unwrap();
        assert_eq!(meta.operation_id.as_deref(), Some("op_42"));

        let meta = openapi().name("a").operation_id("@@@").build().unwrap();
        assert!(meta.operation_id.is_none());
    }

    #[test]
    fn validates_parameter_shape() {
        let meta = openapi()
            .name("a")
            .parameter(json!({"name": "id", "in": "path", "required": true}))
            .build()
            .unwrap();
        assert_eq!(meta.parameters[0].name(), Some("id"));
        assert_eq!(meta.parameters[0].get("required"), Some(&json!(true)));

        let err = openapi()
            .name("a")
            .parameter(json!({"name": "id", "in": "path"}))
            .parameter(json!({"in": "query"}))
            .build()
            .unwrap_err();
        assert_eq!(
            err.kind,
            RegistrationErrorKind::InvalidParameter {
                index: 1,
                reason: "missing required field: name".to_string()
            }
        );

        let err = openapi()
            .name("a")
            .parameter(json!(["name", "in"]))
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind,
            RegistrationErrorKind::InvalidParameter { index: 0, .. }
        ));

    }

    #[test]
    fn parameter_values_are_not_second_guessed() {
        let declared = json!({"in": "body", "name": 7, "schema": {"type": "string"}});
        let meta = openapi()
            .name("a")
            .parameter(declared.clone())
            .build()
            .unwrap();
        assert_eq!(meta.parameters[0].location(), Some("body"));
        assert_eq!(meta.parameters[0].name(), None);
        assert_eq!(serde_json::to_value(&meta.parameters[0]).unwrap(), declared);
    }

    #[test]
    fn rejects_blank_security_scheme() {
        let err = openapi()
            .name("a")
            .security("BearerAuth", Vec::<String>::new())
            .security(" ", ["read"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err.kind,
            RegistrationErrorKind::InvalidSecurity { index: 1, .. }
        ));
    }

    #[test]
    fn rejects_badly_named_model() {
        let model = Arc::new(StaticModel::new("List[Todo]", json!({"type": "array"})));
        let err = openapi().name("a").response_model(model).build().unwrap_err();
        assert!(matches!(
            err.kind,
            RegistrationErrorKind::InvalidModel { field: "response_model", .. }
        ));
    }

    #[test]
    fn rejects_non_object_request_body() {
        let err = openapi()
            .name("a")
            .request_body(json!("string"))
            .build()
            .unwrap_err();
        assert_eq!(err.kind.field(), "request_body");
    }

    #[test]
    fn rejects_missing_name() {
        let err = openapi().summary("anonymous").build().unwrap_err();
        assert_eq!(err.kind, RegistrationErrorKind::EmptyName);
    }

    #[test]
    fn attach_derives_name_and_identity_from_handler() {
        let registry = Registry::new();
        let handler = openapi().summary("Greet").attach(&registry, greet).unwrap();
        assert_eq!(handler(), "hi");

        let all = registry.get_all();
        let meta = &all["greet"];
        assert!(meta.handler_id.ends_with("::greet"));
        assert_ne!(meta.handler_id, "greet");
    }

    #[test]
    fn attach_requires_name_for_closures() {
        let registry = Registry::new();
        let Err(err) = openapi().attach(&registry, || 1) else {
            panic!("closure without a name should be rejected");
        };
        assert_eq!(err.kind, RegistrationErrorKind::EmptyName);

        let closure = openapi().name("one").attach(&registry, || 1).unwrap();
        assert_eq!(closure(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_validation_registers_nothing() {
        let registry = Registry::new();
        let result = openapi()
            .name("broken")
            .route("relative")
            .register(&registry);
        assert!(result.is_err());
        assert!(registry.is_empty());
    }
}
