use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::OpenApiDocument;
use crate::error::SerializeError;

/// Text encodings a compiled document can be rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/x-yaml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{other}' (expected json or yaml)")),
        }
    }
}

/// Pretty-printed JSON with two-space indentation. Non-ASCII text is kept as is.
pub fn to_json(doc: &OpenApiDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Block-style YAML in document key order.
pub fn to_yaml(doc: &OpenApiDocument) -> Result<String, serde_yaml_ng::Error> {
    serde_yaml_ng::to_string(doc)
}

pub fn render(doc: &OpenApiDocument, format: OutputFormat) -> Result<String, SerializeError> {
    Ok(match format {
        OutputFormat::Json => to_json(doc)?,
        OutputFormat::Yaml => to_yaml(doc)?,
    })
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::document::Info;

    fn doc(title: &str) -> OpenApiDocument {
        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: title.to_string(),
                version: "1.0.0".to_string(),
                description: String::new(),
                summary: None,
            },
            paths: IndexMap::new(),
            components: None,
        }
    }

    #[test]
    fn json_keeps_unicode_and_indents_two_spaces() {
        let json = to_json(&doc("Grüße API")).unwrap();
        assert!(json.contains("Grüße API"));
        assert!(json.contains("\n  \"openapi\": \"3.0.0\""));
    }

    #[test]
    fn yaml_round_trips_through_parser() {
        let original = doc("YAML API");
        let yaml = to_yaml(&original).unwrap();
        assert!(yaml.starts_with("openapi:"));
        let parsed = crate::document::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("toml".parse::<OutputFormat>().is_err());
    }
}
