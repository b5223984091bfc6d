use std::fmt;

use serde_json::Value;

use crate::error::SchemaError;
use crate::transform::components::rewrite_local_refs;

/// Reference template handed to [`ModelType::schema`]: `{model}` is replaced
/// by the referenced definition's name.
pub const REF_TEMPLATE: &str = "#/components/schemas/{model}";

/// A data-model type that can describe itself as a JSON schema.
///
/// Request and response models attached to a handler must implement this.
/// The schema may inline nested definitions under `$defs` or `definitions`
/// and point at them with local references; the normalizer flattens both
/// conventions into `components.schemas`.
pub trait ModelType: Send + Sync {
    /// Stable name, used as the default `components.schemas` key.
    fn name(&self) -> &str;

    /// Dump this model's schema, pointing references at `ref_template`.
    fn schema(&self, ref_template: &str) -> Result<Value, SchemaError>;
}

impl fmt::Debug for dyn ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelType").field(&self.name()).finish()
    }
}

/// A model backed by a pre-computed JSON schema dump.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticModel {
    name: String,
    schema: Value,
}

impl StaticModel {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

impl ModelType for StaticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self, ref_template: &str) -> Result<Value, SchemaError> {
        if !self.schema.is_object() {
            return Err(SchemaError::NotAnObject(self.name.clone()));
        }
        let mut schema = self.schema.clone();
        rewrite_local_refs(&mut schema, ref_template);
        Ok(schema)
    }
}

/// Check a model name against the OpenAPI component key pattern
/// `^[a-zA-Z0-9._-]+$`.
pub fn is_valid_component_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn static_model_applies_ref_template() {
        let model = StaticModel::new(
            "Order",
            json!({
                "type": "object",
                "properties": {"line": {"$ref": "#/$defs/Line"}},
                "$defs": {"Line": {"type": "object"}}
            }),
        );
        let schema = model.schema(REF_TEMPLATE).unwrap();
        assert_eq!(
            schema["properties"]["line"]["$ref"],
            "#/components/schemas/Line"
        );
        // Definitions are left for the normalizer to flatten.
        assert!(schema.get("$defs").is_some());
    }

    #[test]
    fn static_model_rejects_non_object_schema() {
        let model = StaticModel::new("Broken", json!("not a schema"));
        assert!(matches!(
            model.schema(REF_TEMPLATE),
            Err(SchemaError::NotAnObject(name)) if name == "Broken"
        ));
    }

    #[test]
    fn component_name_pattern() {
        assert!(is_valid_component_name("Todo_Response-v1.2"));
        assert!(!is_valid_component_name(""));
        assert!(!is_valid_component_name("List[Todo]"));
        assert!(!is_valid_component_name("a/b"));
    }
}
