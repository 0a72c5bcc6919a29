//! Shared builders for integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;

use serde_json::{json, Value};

use flowpilot::adapter::snapshot::EditorSnapshot;
use flowpilot::models::diagnostics::RawError;
use flowpilot::models::workflow::{Edge, FieldInfo, NodeOutput, NodeRef, WorkflowStructure};

pub fn field(name: &str, value: Value) -> FieldInfo {
    FieldInfo {
        name: name.to_string(),
        value,
        field_type: None,
    }
}

pub fn output(data: Value) -> NodeOutput {
    NodeOutput {
        data: Some(data),
        error: None,
        timestamp: Some("2025-01-01T00:00:00Z".to_string()),
    }
}

/// Webhook -> Set -> HTTP Request -> Slack, with the HTTP Request node open
pub fn sample_workflow() -> WorkflowStructure {
    WorkflowStructure::new(
        vec![
            NodeRef::new("hook", "Webhook", "Incoming"),
            NodeRef::new("map", "Set", "Map fields"),
            NodeRef::new("call", "HTTP Request", "Call API"),
            NodeRef::new("notify", "Slack", "Notify"),
        ],
        vec![
            Edge::new("hook", "map"),
            Edge::new("map", "call"),
            Edge::new("call", "notify"),
        ],
    )
}

pub fn sample_snapshot() -> EditorSnapshot {
    let mut settings = BTreeMap::new();
    settings.insert(
        "call".to_string(),
        vec![
            field("URL", json!("https://api.example.com/orders")),
            field("Authentication", json!("none")),
        ],
    );

    let mut outputs = BTreeMap::new();
    outputs.insert("hook".to_string(), output(json!({"body": {"orderId": 7}})));
    outputs.insert("map".to_string(), output(json!([{"orderId": 7, "customer": "ada"}])));

    EditorSnapshot {
        platform: "n8n".to_string(),
        url: Some("https://n8n.example.com/workflow/42".to_string()),
        workflow: sample_workflow(),
        selected_node_id: Some("call".to_string()),
        settings,
        outputs,
        errors: vec![RawError::new("Request timeout after 30s").on_node("call")],
        ..Default::default()
    }
}
