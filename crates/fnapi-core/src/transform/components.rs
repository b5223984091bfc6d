use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::error::SchemaError;
use crate::model::{ModelType, REF_TEMPLATE};

/// Prefix of every reference into the shared schema table.
pub const COMPONENTS_REF_PREFIX: &str = "#/components/schemas/";

/// Containers model schemas use for their nested definitions.
const LOCAL_DEFINITION_KEYS: [&str; 2] = ["$defs", "definitions"];

/// Local reference prefixes matching [`LOCAL_DEFINITION_KEYS`].
const LOCAL_REF_PREFIXES: [&str; 2] = ["#/$defs/", "#/definitions/"];

/// Rewrite every local `$ref` (`#/$defs/X`, `#/definitions/X`) to
/// `template` with `{model}` replaced by `X`.
pub fn rewrite_local_refs(value: &mut Value, template: &str) {
    visit_refs(value, &mut |reference| {
        LOCAL_REF_PREFIXES.iter().find_map(|prefix| {
            reference
                .strip_prefix(prefix)
                .map(|name| template.replace("{model}", name))
        })
    });
}

/// Build a `{"$ref": "#/components/schemas/<name>"}` object.
pub fn component_ref(name: &str) -> Value {
    json!({ "$ref": format!("{COMPONENTS_REF_PREFIX}{name}") })
}

/// Walk `value`, replacing each `$ref` string for which `rewrite` returns
/// a new target.
fn visit_refs(value: &mut Value, rewrite: &mut impl FnMut(&str) -> Option<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "$ref" {
                    if let Value::String(reference) = child {
                        if let Some(replacement) = rewrite(reference) {
                            *reference = replacement;
                        }
                        continue;
                    }
                }
                visit_refs(child, rewrite);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_refs(item, rewrite);
            }
        }
        _ => {}
    }
}

/// Names of component schemas referenced anywhere inside `value`.
fn referenced_components(value: &Value) -> HashSet<String> {
    fn collect(value: &Value, out: &mut HashSet<String>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    match (key.as_str(), child) {
                        ("$ref", Value::String(reference)) => {
                            if let Some(name) = reference.strip_prefix(COMPONENTS_REF_PREFIX) {
                                out.insert(name.to_string());
                            }
                        }
                        _ => collect(child, out),
                    }
                }
            }
            Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
            _ => {}
        }
    }
    let mut out = HashSet::new();
    collect(value, &mut out);
    out
}

/// Point references at renamed components. `renames` maps original to final names.
fn apply_renames(value: &mut Value, renames: &IndexMap<String, String>) {
    visit_refs(value, &mut |reference| {
        let name = reference.strip_prefix(COMPONENTS_REF_PREFIX)?;
        match renames.get(name) {
            Some(renamed) if renamed != name => Some(format!("{COMPONENTS_REF_PREFIX}{renamed}")),
            _ => None,
        }
    });
}

/// Remove every local definitions container from `schema`, returning the
/// definitions it held.
fn take_definitions(schema: &mut Value) -> Vec<(String, Value)> {
    let Value::Object(map) = schema else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for key in LOCAL_DEFINITION_KEYS {
        if let Some(Value::Object(defs)) = map.shift_remove(key) {
            found.extend(defs);
        }
    }
    found
}

/// If `schema` is nothing but a `$ref` into the component table, the name it targets.
fn alias_target(schema: &Map<String, Value>) -> Option<&str> {
    if schema.len() != 1 {
        return None;
    }
    schema
        .get("$ref")?
        .as_str()?
        .strip_prefix(COMPONENTS_REF_PREFIX)
}

/// The `components.schemas` table built during one compilation pass.
///
/// Names are unique. A schema equal to one already present reuses its name;
/// a different schema under a taken name is stored as `<name>_2`, `<name>_3`, ...
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentsTable {
    schemas: IndexMap<String, Value>,
}

impl ComponentsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.schemas.iter()
    }

    pub fn into_schemas(self) -> IndexMap<String, Value> {
        self.schemas
    }

    /// Normalize `model` into the table and return a reference to its schema.
    ///
    /// Nested definitions are flattened into top-level entries, local
    /// references are pointed at `#/components/schemas/`, and any entry
    /// renamed to avoid a collision has every reference to it within this
    /// model rewritten before insertion.
    pub fn register_model(&mut self, model: &dyn ModelType) -> Result<Value, SchemaError> {
        let mut root = model.schema(REF_TEMPLATE)?;
        if !root.is_object() {
            return Err(SchemaError::NotAnObject(model.name().to_string()));
        }
        rewrite_local_refs(&mut root, REF_TEMPLATE);

        let definitions = flatten_definitions(&mut root);
        let renames = self.insert_definitions(definitions);

        let Value::Object(ref mut root_map) = root else {
            return Err(SchemaError::NotAnObject(model.name().to_string()));
        };

        // Self-referencing models dump as a bare `$ref` to their own definition.
        if let Some(target) = alias_target(root_map) {
            if let Some(renamed) = renames.get(target) {
                return Ok(component_ref(renamed));
            }
        }

        if root_map.is_empty() {
            root_map.insert("type".to_string(), json!("object"));
        }

        let root_name = model.name();
        apply_renames(&mut root, &renames);
        let follow_renames = !renames.contains_key(root_name);
        let final_name = self
            .claim(vec![(root_name.to_string(), root)], follow_renames)
            .swap_remove(root_name)
            .unwrap_or_else(|| root_name.to_string());
        log::debug!("model '{root_name}' registered as component '{final_name}'");
        Ok(component_ref(&final_name))
    }

    /// Insert a batch of flattened definitions, returning original → final names.
    ///
    /// A definition is placed once everything it references in the batch
    /// has a final name. Definitions that reference each other are placed
    /// together so a reused entry never points at another model's schemas.
    fn insert_definitions(
        &mut self,
        definitions: IndexMap<String, Value>,
    ) -> IndexMap<String, String> {
        let mut renames: IndexMap<String, String> = IndexMap::new();
        let mut pending: Vec<String> = definitions.keys().cloned().collect();

        while !pending.is_empty() {
            let ready = pending.iter().position(|name| {
                referenced_components(&definitions[name]).iter().all(|dep| {
                    dep == name || !definitions.contains_key(dep) || renames.contains_key(dep)
                })
            });
            let group = match ready {
                Some(index) => vec![pending.remove(index)],
                None => {
                    let group = cycle_group(&definitions, &pending);
                    pending.retain(|name| !group.contains(name));
                    group
                }
            };

            let members = group
                .into_iter()
                .map(|name| {
                    let mut schema = definitions[&name].clone();
                    apply_renames(&mut schema, &renames);
                    (name, schema)
                })
                .collect();
            renames.extend(self.claim(members, true));
        }

        renames
    }

    /// Find the names a group of schemas lives under, inserting as needed.
    ///
    /// Tries `base`, then `base_2`, `base_3`, ... with one suffix shared by
    /// the whole group: the first suffix where every member's name is free
    /// or already holds an equal schema wins. With `follow_renames`,
    /// references between members point at their candidate names before
    /// comparing.
    fn claim(
        &mut self,
        members: Vec<(String, Value)>,
        follow_renames: bool,
    ) -> IndexMap<String, String> {
        let mut suffix = 1usize;
        loop {
            let names: IndexMap<String, String> = members
                .iter()
                .map(|(base, _)| {
                    let candidate = if suffix == 1 {
                        base.clone()
                    } else {
                        format!("{base}_{suffix}")
                    };
                    (base.clone(), candidate)
                })
                .collect();

            let candidates: Vec<(&String, Value)> = members
                .iter()
                .map(|(base, schema)| {
                    let mut candidate = schema.clone();
                    if follow_renames {
                        apply_renames(&mut candidate, &names);
                    }
                    (&names[base], candidate)
                })
                .collect();

            let fits = candidates.iter().all(|(name, candidate)| {
                self.schemas
                    .get(name.as_str())
                    .is_none_or(|existing| existing == candidate)
            });
            if fits {
                for (name, candidate) in candidates {
                    if !self.schemas.contains_key(name.as_str()) {
                        self.schemas.insert(name.clone(), candidate);
                    }
                }
                return names;
            }
            suffix += 1;
        }
    }
}

/// Batch definitions still pending that `name` references, in pending order.
fn pending_references(
    definitions: &IndexMap<String, Value>,
    pending: &[String],
    name: &str,
) -> Vec<String> {
    let referenced = referenced_components(&definitions[name]);
    pending
        .iter()
        .filter(|candidate| referenced.contains(candidate.as_str()))
        .cloned()
        .collect()
}

/// Pending definitions reachable from `start` through references.
fn reachable(
    definitions: &IndexMap<String, Value>,
    pending: &[String],
    start: &str,
) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut stack = pending_references(definitions, pending, start);
    while let Some(name) = stack.pop() {
        if seen.insert(name.clone()) {
            stack.extend(pending_references(definitions, pending, &name));
        }
    }
    seen
}

/// A reference cycle among `pending` whose outside references are all
/// resolved, members in declaration order. Only called when no single
/// pending definition is ready.
fn cycle_group(definitions: &IndexMap<String, Value>, pending: &[String]) -> Vec<String> {
    let mut head = pending[0].clone();
    loop {
        let from_head = reachable(definitions, pending, &head);
        let group: Vec<String> = pending
            .iter()
            .filter(|name| {
                **name == head
                    || (from_head.contains(name.as_str())
                        && reachable(definitions, pending, name).contains(&head))
            })
            .cloned()
            .collect();

        let outside = group
            .iter()
            .flat_map(|name| pending_references(definitions, pending, name))
            .find(|dep| !group.contains(dep));
        match outside {
            Some(next) => head = next,
            None => return group,
        }
    }
}

/// Pull nested definitions out of `root`, breadth-first, so no definitions
/// container survives anywhere in the output.
fn flatten_definitions(root: &mut Value) -> IndexMap<String, Value> {
    let mut flattened: IndexMap<String, Value> = IndexMap::new();
    let mut queue: VecDeque<(String, Value)> = take_definitions(root).into();

    while let Some((name, mut schema)) = queue.pop_front() {
        rewrite_local_refs(&mut schema, REF_TEMPLATE);
        queue.extend(take_definitions(&mut schema));
        match flattened.get(&name) {
            Some(existing) if *existing != schema => {
                log::warn!(
                    "conflicting nested definitions named '{name}'; references resolve to the first"
                );
            }
            Some(_) => {}
            None => {
                flattened.insert(name, schema);
            }
        }
    }
    flattened
}
