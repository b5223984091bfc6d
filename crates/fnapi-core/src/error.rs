use std::fmt;

use thiserror::Error;

/// Failure to read an existing OpenAPI document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// Failure of a model type to describe itself.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema dump for model '{model}' failed: {reason}")]
    Dump { model: String, reason: String },

    #[error("schema for model '{0}' is not a JSON object")]
    NotAnObject(String),
}

/// The field of a handler declaration that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationErrorKind {
    EmptyName,
    InvalidRoute(String),
    InvalidParameter { index: usize, reason: String },
    InvalidTag { index: usize, reason: String },
    InvalidSecurity { index: usize, reason: String },
    InvalidModel { field: &'static str, reason: String },
}

impl RegistrationErrorKind {
    /// Name of the offending metadata field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::InvalidRoute(_) => "route",
            Self::InvalidParameter { .. } => "parameters",
            Self::InvalidTag { .. } => "tags",
            Self::InvalidSecurity { .. } => "security",
            Self::InvalidModel { field, .. } => *field,
        }
    }
}

impl fmt::Display for RegistrationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "handler name must not be empty"),
            Self::InvalidRoute(route) => write!(f, "invalid route path: {route}"),
            Self::InvalidParameter { index, reason } => {
                write!(f, "parameter at index {index} {reason}")
            }
            Self::InvalidTag { index, reason } => write!(f, "tag at index {index} {reason}"),
            Self::InvalidSecurity { index, reason } => {
                write!(f, "security requirement at index {index} {reason}")
            }
            Self::InvalidModel { field, reason } => write!(f, "{field}: {reason}"),
        }
    }
}

/// A handler declaration was rejected before it reached the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to register OpenAPI metadata for handler '{handler}' ({}): {kind}", .kind.field())]
pub struct RegistrationError {
    pub handler: String,
    pub kind: RegistrationErrorKind,
}

impl RegistrationError {
    pub fn new(handler: impl Into<String>, kind: RegistrationErrorKind) -> Self {
        Self {
            handler: handler.into(),
            kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("timed out after {0:?} waiting for the handler registry lock")]
    LockTimeout(std::time::Duration),
}

/// Document-level compilation failure. Per-handler faults never surface here.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unsupported OpenAPI version: {version} (supported: {})", .supported.join(", "))]
    UnsupportedVersion {
        version: String,
        supported: Vec<&'static str>,
    },

    #[error("failed to read handler registry: {0}")]
    Registry(#[from] RegistryError),
}

/// A single handler's metadata could not be turned into an operation. The
/// compiler logs these and skips the handler.
#[derive(Debug, Error)]
pub enum HandlerFault {
    #[error("response '{status}' must be a JSON object")]
    ResponseNotObject { status: String },

    #[error("response '{status}' has malformed content: {source}")]
    ResponseContent {
        status: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to generate OpenAPI specification: {0}")]
    Compile(#[from] CompileError),

    #[error("failed to render OpenAPI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render OpenAPI YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse manifest YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

#[derive(Debug, Error)]
#[error("failed to render Swagger UI: {0}")]
pub struct UiError(#[from] pub minijinja::Error);
