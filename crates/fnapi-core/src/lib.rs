pub mod cache;
pub mod compile;
pub mod config;
pub mod document;
pub mod error;
pub mod http;
pub mod manifest;
pub mod metadata;
pub mod model;
pub mod registry;
pub mod sanitize;
pub mod serialize;
pub mod service;
pub mod transform;
pub mod ui;

pub use compile::{CompileOptions, SpecVersion, compile, generate};
pub use document::OpenApiDocument;
pub use metadata::{HandlerMetadata, HandlerMetadataBuilder, openapi};
pub use model::{ModelType, StaticModel};
pub use registry::{MetadataSource, Registry};
pub use serialize::OutputFormat;
pub use service::DocsService;
