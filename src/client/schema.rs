//! Schema transformation for function declarations.

use serde_json::{Map, Value};

/// Keywords the function-declaration schema dialect rejects.
///
/// The hosted model accepts an OpenAPI-style subset: no `$schema`/`$ref`
/// plumbing, no `additionalProperties`, and nullability expressed with
/// `nullable` rather than type unions.
const UNSUPPORTED_PROPERTIES: &[&str] = &[
    "$schema",
    "$id",
    "title",
    "additionalProperties",
    "format",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "default",
];

/// Transform a schemars-generated schema into the function-declaration dialect.
///
/// - Removes unsupported keywords (see `UNSUPPORTED_PROPERTIES`)
/// - Rewrites `"type": ["string", "null"]` as `"type": "string", "nullable": true`
/// - Collapses `anyOf: [{..}, {"type": "null"}]` into the non-null branch
/// - Guarantees every object schema has a `properties` map
pub fn transform_for_functions(schema: Value) -> Value {
    transform_value(schema)
}

fn transform_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(transform_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(transform_value).collect()),
        other => other,
    }
}

fn transform_map(mut map: Map<String, Value>) -> Map<String, Value> {
    for prop in UNSUPPORTED_PROPERTIES {
        map.remove(*prop);
    }

    let type_union = match map.get("type") {
        Some(Value::Array(types)) => Some(types.clone()),
        _ => None,
    };
    if let Some(types) = type_union {
        let mut non_null = types.iter().filter(|t| t.as_str() != Some("null"));
        match non_null.next() {
            Some(first) => map.insert("type".to_string(), first.clone()),
            None => map.remove("type"),
        };
        if types.iter().any(|t| t.as_str() == Some("null")) {
            map.insert("nullable".to_string(), Value::Bool(true));
        }
    }

    let collapsed = match map.get("anyOf") {
        Some(Value::Array(branches)) => {
            let non_null: Vec<&Value> = branches
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) != Some("null"))
                .collect();
            match non_null.as_slice() {
                [Value::Object(inner)] if branches.len() > 1 => Some(inner.clone()),
                _ => None,
            }
        }
        _ => None,
    };
    if let Some(inner) = collapsed {
        map.remove("anyOf");
        for (k, v) in inner {
            map.entry(k).or_insert(v);
        }
        map.insert("nullable".to_string(), Value::Bool(true));
    }

    if map.get("type").and_then(Value::as_str) == Some("object") && !map.contains_key("properties")
    {
        map.insert("properties".to_string(), Value::Object(Map::new()));
    }

    map.into_iter()
        .map(|(k, v)| {
            let v = if k == "properties" {
                transform_properties(v)
            } else {
                transform_value(v)
            };
            (k, v)
        })
        .collect()
}

// Property names are user data, not keywords: only their schemas are rewritten.
fn transform_properties(value: Value) -> Value {
    match value {
        Value::Object(props) => Value::Object(
            props
                .into_iter()
                .map(|(name, schema)| (name, transform_value(schema)))
                .collect(),
        ),
        other => other,
    }
}

/// Generate a function-declaration schema from a Rust type using schemars.
pub fn function_schema<T: schemars::JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let value = serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}));
    transform_for_functions(value)
}
