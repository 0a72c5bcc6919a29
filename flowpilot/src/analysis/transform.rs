//! Heuristics for what happens to data between two connected nodes

use crate::models::flow::{DataChanges, TransformationKind};
use crate::models::workflow::NodeRef;

/// Categorize the hop `from -> to`. Missing nodes yield `Unknown`.
pub fn classify_transformation(from: Option<&NodeRef>, to: Option<&NodeRef>) -> TransformationKind {
    let (Some(from), Some(to)) = (from, to) else {
        return TransformationKind::Unknown;
    };
    let (from_type, to_type) = (from.node_type.as_str(), to.node_type.as_str());

    match to_type {
        "Function" | "Code" => TransformationKind::CodeTransformation,
        "Set" => TransformationKind::FieldMapping,
        "IF" => TransformationKind::ConditionalRouting,
        "Merge" => TransformationKind::DataMerge,
        "Split In Batches" => TransformationKind::DataSplit,
        t if t.contains("Filter") => TransformationKind::DataFilter,
        t if from_type == "HTTP Request" && t.contains("Database") => TransformationKind::ApiToDatabase,
        "Slack" | "Email" if from_type.contains("Form") => TransformationKind::FormToNotification,
        _ => TransformationKind::DirectPass,
    }
}

/// Rough field-level changes introduced by the receiving node
pub fn estimate_data_changes(to: Option<&NodeRef>) -> DataChanges {
    let mut changes = DataChanges::default();
    match to.map(|n| n.node_type.as_str()) {
        Some("Set") => changes.fields_added.push("mapped fields".to_string()),
        Some("Function") | Some("Code") => changes.fields_transformed.push("function result".to_string()),
        Some(t) if t.contains("Filter") => changes.fields_removed.push("filtered items".to_string()),
        _ => {}
    }
    changes
}
