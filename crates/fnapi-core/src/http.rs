//! Transport-neutral responses for the documentation endpoints.
//!
//! Hosts translate a [`DocsResponse`] into whatever their HTTP framework
//! expects; nothing here depends on one.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value, json};

use crate::compile::{CompileOptions, SpecVersion};
use crate::registry::MetadataSource;
use crate::serialize::OutputFormat;
use crate::service::DocsService;
use crate::ui::{UiOptions, render_swagger_ui};

pub const ERROR_CODE_HEADER: &str = "X-Error-Code";
pub const TEXT_HTML: &str = "text/html";

/// Query parameters read by [`options_from_query`].
pub const TITLE_PARAM: &str = "title";
pub const VERSION_PARAM: &str = "version";
pub const SPEC_VERSION_PARAM: &str = "openapi_version";

/// Machine-readable error codes carried in error bodies and the
/// `X-Error-Code` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InternalError,
    OpenapiGenerationError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::OpenapiGenerationError => "OPENAPI_GENERATION_ERROR",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::NotFound => 404,
            Self::InternalError | Self::OpenapiGenerationError => 500,
        }
    }
}

/// A response ready to hand to the host's HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DocsResponse {
    pub status: u16,
    pub body: String,
    pub mime_type: &'static str,
    pub headers: IndexMap<String, String>,
}

impl DocsResponse {
    pub fn ok(body: String, mime_type: &'static str) -> Self {
        Self {
            status: 200,
            body,
            mime_type,
            headers: IndexMap::new(),
        }
    }

    /// A structured JSON error:
    /// `{"error": {"code", "message", "status_code", "details"}}`.
    pub fn error(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        let status = code.status();
        let body = json!({
            "error": {
                "code": code,
                "message": message.into(),
                "status_code": status,
                "details": details,
            }
        });
        let mut headers = IndexMap::new();
        headers.insert(ERROR_CODE_HEADER.to_string(), code.as_str().to_string());
        Self {
            status,
            body: body.to_string(),
            mime_type: OutputFormat::Json.mime_type(),
            headers,
        }
    }
}

/// Compile options from request query parameters, falling back to `defaults`.
pub fn options_from_query(
    query: &IndexMap<String, String>,
    defaults: &CompileOptions,
) -> Result<CompileOptions, DocsResponse> {
    let spec_version = match query.get(SPEC_VERSION_PARAM) {
        Some(raw) => raw.parse::<SpecVersion>().map_err(|err| {
            DocsResponse::error(
                ErrorCode::ValidationError,
                err.to_string(),
                json!({ "parameter": SPEC_VERSION_PARAM, "value": raw }),
            )
        })?,
        None => defaults.spec_version,
    };
    Ok(CompileOptions {
        title: query
            .get(TITLE_PARAM)
            .cloned()
            .unwrap_or_else(|| defaults.title.clone()),
        version: query
            .get(VERSION_PARAM)
            .cloned()
            .unwrap_or_else(|| defaults.version.clone()),
        spec_version,
    })
}

fn document_response<S: MetadataSource>(
    service: &DocsService<S>,
    options: &CompileOptions,
    format: OutputFormat,
) -> DocsResponse {
    match service.render(options, format) {
        Ok(body) => DocsResponse::ok(body, format.mime_type()),
        Err(err) => {
            log::error!("failed to serve OpenAPI {format}: {err}");
            DocsResponse::error(
                ErrorCode::OpenapiGenerationError,
                "Failed to generate OpenAPI specification",
                json!({ "reason": err.to_string() }),
            )
        }
    }
}

pub fn openapi_json_response<S: MetadataSource>(
    service: &DocsService<S>,
    options: &CompileOptions,
) -> DocsResponse {
    document_response(service, options, OutputFormat::Json)
}

pub fn openapi_yaml_response<S: MetadataSource>(
    service: &DocsService<S>,
    options: &CompileOptions,
) -> DocsResponse {
    document_response(service, options, OutputFormat::Yaml)
}

/// Headers sent with the Swagger UI page. The page must not be framed,
/// sniffed or cached.
fn ui_security_headers(csp: &str) -> IndexMap<String, String> {
    [
        ("Content-Security-Policy", csp),
        ("X-Content-Type-Options", "nosniff"),
        ("X-Frame-Options", "DENY"),
        ("X-XSS-Protection", "1; mode=block"),
        ("Referrer-Policy", "strict-origin-when-cross-origin"),
        ("Strict-Transport-Security", "max-age=31536000; includeSubDomains"),
        ("Cache-Control", "no-cache, no-store, must-revalidate"),
        ("Pragma", "no-cache"),
        ("Expires", "0"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

pub fn swagger_ui_response(options: &UiOptions) -> DocsResponse {
    match render_swagger_ui(options) {
        Ok(html) => DocsResponse {
            headers: ui_security_headers(options.csp()),
            ..DocsResponse::ok(html, TEXT_HTML)
        },
        Err(err) => {
            log::error!("{err}");
            DocsResponse::error(
                ErrorCode::InternalError,
                "Failed to render Swagger UI",
                json!({ "reason": err.to_string() }),
            )
        }
    }
}
