use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::document::{MediaType, OpenApiDocument};

/// Value of the `openapi` field after upgrading.
pub const OPENAPI_3_1: &str = "3.1.0";

/// Keys holding a list of sub-schemas.
const COMPOSITION_KEYS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Convert one 3.0-style schema into its 3.1 shape.
///
/// `nullable: true` alongside a `type` becomes a `[type, "null"]` union and a
/// singular `example` becomes `examples: [example]`. Nested `properties`,
/// `items`, composition lists and object-valued `additionalProperties` are
/// converted too. Converting an already-converted schema is a no-op.
pub fn convert_schema(schema: &Value) -> Value {
    let mut converted = schema.clone();
    convert_in_place(&mut converted);
    converted
}

/// Convert every entry of a `components.schemas` table.
pub fn convert_schemas(schemas: &IndexMap<String, Value>) -> IndexMap<String, Value> {
    schemas
        .iter()
        .map(|(name, schema)| (name.clone(), convert_schema(schema)))
        .collect()
}

/// Produce the OpenAPI 3.1 form of a compiled 3.0 document.
pub fn to_3_1(doc: &OpenApiDocument) -> OpenApiDocument {
    let mut upgraded = doc.clone();
    upgrade_in_place(&mut upgraded);
    upgraded
}

pub(crate) fn upgrade_in_place(doc: &mut OpenApiDocument) {
    doc.openapi = OPENAPI_3_1.to_string();
    doc.info.summary = Some(doc.info.title.clone());

    if let Some(components) = doc.components.as_mut() {
        components.schemas.values_mut().for_each(convert_in_place);
    }

    for operation in doc.paths.values_mut().flat_map(|item| item.values_mut()) {
        for parameter in &mut operation.parameters {
            if let Some(schema) = parameter.schema_mut() {
                convert_in_place(schema);
            }
        }
        if let Some(body) = operation.request_body.as_mut() {
            convert_content(&mut body.content);
        }
        for response in operation.responses.values_mut() {
            if let Some(content) = response.content.as_mut() {
                convert_content(content);
            }
        }
    }
}

fn convert_content(content: &mut IndexMap<String, MediaType>) {
    for media in content.values_mut() {
        if let Some(schema) = media.schema_mut() {
            convert_in_place(schema);
        }
    }
}

fn convert_in_place(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    convert_nullable(map);
    convert_example(map);

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        properties.values_mut().for_each(convert_in_place);
    }
    if let Some(items) = map.get_mut("items") {
        convert_in_place(items);
    }
    for key in COMPOSITION_KEYS {
        if let Some(Value::Array(members)) = map.get_mut(key) {
            members.iter_mut().for_each(convert_in_place);
        }
    }
    // Boolean `additionalProperties` is left alone by convert_in_place.
    if let Some(additional) = map.get_mut("additionalProperties") {
        convert_in_place(additional);
    }
}

fn convert_nullable(map: &mut Map<String, Value>) {
    if map.get("nullable") != Some(&Value::Bool(true)) || !map.contains_key("type") {
        return;
    }
    if let Some(ty) = map.get_mut("type") {
        match ty {
            Value::String(name) => {
                *ty = Value::Array(vec![Value::String(name.clone()), Value::from("null")]);
            }
            Value::Array(types) => {
                let null = Value::from("null");
                if !types.contains(&null) {
                    types.push(null);
                }
            }
            _ => {}
        }
    }
    map.shift_remove("nullable");
}

fn convert_example(map: &mut Map<String, Value>) {
    let Some(example) = map.shift_remove("example") else {
        return;
    };
    if !map.contains_key("examples") {
        map.insert("examples".to_string(), Value::Array(vec![example]));
    }
}
