use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::compile::{CompileOptions, SpecVersion};
use crate::error::ConfigError;
use crate::serialize::OutputFormat;

/// Top-level project configuration loaded from `.fnapi.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FnapiConfig {
    pub title: String,
    pub version: String,
    pub spec_version: SpecVersion,
    pub format: OutputFormat,
    /// Handler manifest to compile.
    pub manifest: PathBuf,
    /// Where `fnapi generate` writes; stdout when unset.
    pub output: Option<PathBuf>,
    pub cache_ttl_secs: u64,
}

impl Default for FnapiConfig {
    fn default() -> Self {
        let options = CompileOptions::default();
        Self {
            title: options.title,
            version: options.version,
            spec_version: options.spec_version,
            format: OutputFormat::Json,
            manifest: PathBuf::from("handlers.yaml"),
            output: None,
            cache_ttl_secs: 600,
        }
    }
}

impl FnapiConfig {
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::new(&self.title, &self.version).spec_version(self.spec_version)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".fnapi.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<FnapiConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config = serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# fnapi configuration
title: API
version: 1.0.0
spec_version: 3.0.0    # 3.0.0 | 3.1.0
format: json           # json | yaml

# Handler declarations to compile.
manifest: handlers.yaml
# output: openapi.json  # stdout when unset

# How long served documents stay cached, in seconds.
cache_ttl_secs: 600
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FnapiConfig::default();
        assert_eq!(config.title, "API");
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.spec_version, SpecVersion::V3_0);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.manifest, PathBuf::from("handlers.yaml"));
        assert!(config.output.is_none());
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_default_content_matches_defaults() {
        let config: FnapiConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config, FnapiConfig::default());
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
title: Todo API
version: 2.1.0
spec_version: 3.1.0
format: yaml
manifest: api/handlers.json
output: docs/openapi.yaml
cache_ttl_secs: 30
"#;
        let config: FnapiConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.title, "Todo API");
        assert_eq!(config.spec_version, SpecVersion::V3_1);
        assert_eq!(config.format, OutputFormat::Yaml);
        assert_eq!(config.output, Some(PathBuf::from("docs/openapi.yaml")));

        let options = config.compile_options();
        assert_eq!(options.version, "2.1.0");
        assert_eq!(options.spec_version, SpecVersion::V3_1);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: FnapiConfig = serde_yaml_ng::from_str("title: Mini\n").unwrap();
        assert_eq!(config.title, "Mini");
        // Defaults applied
        assert_eq!(config.manifest, PathBuf::from("handlers.yaml"));
        assert_eq!(config.cache_ttl_secs, 600);
    }

    #[test]
    fn test_rejects_unsupported_spec_version() {
        assert!(serde_yaml_ng::from_str::<FnapiConfig>("spec_version: 2.0.0\n").is_err());
    }

    #[test]
    fn test_missing_file_is_none() {
        let path = Path::new("definitely/not/here/.fnapi.yaml");
        assert!(load_config(path).unwrap().is_none());
    }
}
