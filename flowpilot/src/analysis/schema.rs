//! Schema inference over sampled node outputs

use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::flow::{FieldType, OutputSchema, ValueKind};

/// Node types that start a workflow and never receive input
const TRIGGER_TYPES: &[&str] = &["Webhook", "Schedule", "Manual Trigger", "Cron"];

/// Node types whose request body is expected to be a string
const STRING_BODY_TYPES: &[&str] = &["HTTP Request"];

/// Field name fragments that mark a setting as sensitive
const SENSITIVE_FRAGMENTS: &[&str] = &["password", "secret", "token", "apikey", "api_key", "api key", "credential"];

/// Infer a schema from a sampled value.
///
/// Arrays are sampled by their first element. Returns `None` when there is
/// nothing to sample.
pub fn infer_schema(data: &Value) -> Option<OutputSchema> {
    let sample = match data {
        Value::Null => return None,
        Value::Array(items) => items.first()?,
        other => other,
    };

    let fields = match sample {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), ValueKind::of(v))).collect(),
        _ => BTreeMap::new(),
    };

    Some(OutputSchema {
        kind: ValueKind::of(sample),
        fields,
    })
}

/// Flatten a schema into `(field, type)` pairs
pub fn extract_types(schema: &OutputSchema) -> Vec<FieldType> {
    field_types(&schema.fields)
}

pub fn field_types(fields: &BTreeMap<String, ValueKind>) -> Vec<FieldType> {
    fields
        .iter()
        .map(|(field, kind)| FieldType {
            field: field.clone(),
            kind: *kind,
        })
        .collect()
}

/// Merge field maps, later schemas overriding earlier ones
pub fn merge_fields<'a>(schemas: impl IntoIterator<Item = &'a OutputSchema>) -> BTreeMap<String, ValueKind> {
    let mut merged = BTreeMap::new();
    for schema in schemas {
        merged.extend(schema.fields.iter().map(|(k, v)| (k.clone(), *v)));
    }
    merged
}

/// Known output shape of a node type
pub fn expected_output_schema(node_type: &str) -> BTreeMap<String, ValueKind> {
    let fields: &[(&str, ValueKind)] = match node_type {
        "HTTP Request" => &[
            ("statusCode", ValueKind::Number),
            ("headers", ValueKind::Object),
            ("body", ValueKind::Any),
        ],
        "Function" | "Code" => &[("output", ValueKind::Any)],
        "Webhook" => &[
            ("body", ValueKind::Object),
            ("headers", ValueKind::Object),
            ("params", ValueKind::Object),
        ],
        _ => &[],
    };
    fields.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn is_trigger_type(node_type: &str) -> bool {
    TRIGGER_TYPES.contains(&node_type) || node_type.contains("Trigger")
}

pub fn expects_string_body(node_type: &str) -> bool {
    STRING_BODY_TYPES.contains(&node_type)
}

/// Names of settings whose key looks sensitive
pub fn sensitive_field_names(settings: &serde_json::Map<String, Value>) -> Vec<String> {
    settings
        .keys()
        .filter(|key| {
            let key = key.to_lowercase();
            SENSITIVE_FRAGMENTS.iter().any(|f| key.contains(f))
        })
        .cloned()
        .collect()
}
