use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStats, DEFAULT_TTL, TtlCache};
use crate::compile::{CompileOptions, compile};
use crate::config::FnapiConfig;
use crate::document::OpenApiDocument;
use crate::error::{CompileError, SerializeError};
use crate::registry::{MetadataSource, Registry};
use crate::serialize::{self, OutputFormat};

/// Compiles documents on demand and keeps them for a while.
///
/// Documents are cached per [`CompileOptions`]. Registrations made after a
/// document was cached only show up once it expires or
/// [`invalidate`](Self::invalidate) is called.
pub struct DocsService<S = Arc<Registry>> {
    source: S,
    cache: TtlCache<CompileOptions, Arc<OpenApiDocument>>,
}

impl DocsService<&'static Registry> {
    /// A service over [`Registry::global`].
    pub fn global() -> Self {
        Self::new(Registry::global())
    }
}

impl<S: MetadataSource> DocsService<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, DEFAULT_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    /// A service caching for the configured `cache_ttl_secs`.
    pub fn from_config(source: S, config: &FnapiConfig) -> Self {
        Self::with_ttl(source, config.cache_ttl())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The compiled document for `options`, from cache when fresh.
    pub fn document(&self, options: &CompileOptions) -> Result<Arc<OpenApiDocument>, CompileError> {
        if let Some(doc) = self.cache.get(options) {
            log::debug!("serving cached OpenAPI {} document", options.spec_version);
            return Ok(doc);
        }
        let doc = Arc::new(compile(&self.source, options)?);
        let expired = self.cache.cleanup_expired();
        if expired > 0 {
            log::debug!("dropped {expired} expired OpenAPI documents");
        }
        self.cache.set(options.clone(), Arc::clone(&doc), None);
        Ok(doc)
    }

    pub fn render(
        &self,
        options: &CompileOptions,
        format: OutputFormat,
    ) -> Result<String, SerializeError> {
        let doc = self.document(options)?;
        serialize::render(&doc, format)
    }

    pub fn openapi_json(&self, options: &CompileOptions) -> Result<String, SerializeError> {
        self.render(options, OutputFormat::Json)
    }

    pub fn openapi_yaml(&self, options: &CompileOptions) -> Result<String, SerializeError> {
        self.render(options, OutputFormat::Yaml)
    }

    /// Forget every cached document.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::SpecVersion;
    use crate::metadata::openapi;

    #[test]
    fn caches_until_invalidated() {
        let registry = Arc::new(Registry::new());
        openapi().name("one").register(&registry).unwrap();

        let service = DocsService::new(Arc::clone(&registry));
        let options = CompileOptions::default();
        let first = service.document(&options).unwrap();
        assert_eq!(first.paths.len(), 1);

        openapi().name("two").register(&registry).unwrap();
        let cached = service.document(&options).unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        service.invalidate();
        let fresh = service.document(&options).unwrap();
        assert_eq!(fresh.paths.len(), 2);
    }

    #[test]
    fn caches_per_options() {
        let registry = Registry::new();
        let service = DocsService::new(&registry);
        let v30 = CompileOptions::default();
        let v31 = CompileOptions::default().spec_version(SpecVersion::V3_1);

        assert_eq!(service.document(&v30).unwrap().openapi, "3.0.0");
        assert_eq!(service.document(&v31).unwrap().openapi, "3.1.0");
        assert_eq!(service.cache_stats().total_entries, 2);
    }

    #[test]
    fn expired_documents_are_recompiled() {
        let registry = Registry::new();
        let service = DocsService::with_ttl(&registry, Duration::ZERO);
        let options = CompileOptions::default();
        let first = service.document(&options).unwrap();
        let second = service.document(&options).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn expired_documents_do_not_pile_up() {
        let registry = Registry::new();
        let service = DocsService::with_ttl(&registry, Duration::ZERO);
        for title in ["a", "b", "c", "d"] {
            service.document(&CompileOptions::new(title, "1.0.0")).unwrap();
        }
        assert_eq!(service.cache_stats().total_entries, 1);
    }

    #[test]
    fn ttl_comes_from_config() {
        let registry = Registry::new();
        let config = FnapiConfig {
            cache_ttl_secs: 42,
            ..FnapiConfig::default()
        };
        let service = DocsService::from_config(&registry, &config);
        assert_eq!(service.cache_stats().default_ttl, Duration::from_secs(42));
    }

    #[test]
    fn renders_both_formats() {
        let registry = Registry::new();
        openapi().name("ping").register(&registry).unwrap();
        let service = DocsService::new(&registry);
        let options = CompileOptions::new("Ping", "0.1.0");

        let json = service.openapi_json(&options).unwrap();
        assert!(json.contains("\"title\": \"Ping\""));
        let yaml = service.openapi_yaml(&options).unwrap();
        assert!(yaml.contains("title: Ping"));
    }
}
