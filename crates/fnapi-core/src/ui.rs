use minijinja::{AutoEscape, Environment, context};

use crate::error::UiError;

pub const DEFAULT_UI_TITLE: &str = "Swagger UI";
pub const DEFAULT_SPEC_URL: &str = "/api/openapi.json";

/// Content security policy sent with the page unless overridden. Allows the
/// Swagger UI assets from jsDelivr and the inline bootstrap script.
pub const DEFAULT_CSP: &str = "default-src 'self'; \
script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
style-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
img-src 'self' data: https:; \
connect-src 'self'";

/// What the documentation page shows and where it loads the spec from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub title: String,
    pub spec_url: String,
    /// Replaces [`DEFAULT_CSP`] in the response headers.
    pub custom_csp: Option<String>,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_UI_TITLE.to_string(),
            spec_url: DEFAULT_SPEC_URL.to_string(),
            custom_csp: None,
        }
    }
}

impl UiOptions {
    pub fn csp(&self) -> &str {
        self.custom_csp.as_deref().unwrap_or(DEFAULT_CSP)
    }
}

/// Render the Swagger UI page for `options`.
///
/// The title is HTML-escaped and the spec URL is embedded as a JSON string
/// literal, so neither can break out of its context.
pub fn render_swagger_ui(options: &UiOptions) -> Result<String, UiError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_template(
        "swagger_ui.html.j2",
        include_str!("../templates/swagger_ui.html.j2"),
    )?;
    let tmpl = env.get_template("swagger_ui.html.j2")?;
    let html = tmpl.render(context! {
        title => options.title,
        spec_url => options.spec_url,
    })?;
    Ok(html)
}
