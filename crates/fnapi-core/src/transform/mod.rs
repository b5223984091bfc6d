pub mod components;
pub mod upgrade;

pub use components::{ComponentsTable, component_ref, rewrite_local_refs};
pub use upgrade::{convert_schema, convert_schemas, to_3_1};
