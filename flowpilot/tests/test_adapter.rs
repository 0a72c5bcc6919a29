//! Platform adapter integration tests

mod common;

use std::sync::Arc;

use serde_json::json;

use flowpilot::adapter::editor::EditorAdapter;
use flowpilot::adapter::snapshot::{EditorSnapshot, SnapshotDriver};
use flowpilot::adapter::{AdapterRegistry, PlatformAdapter};
use flowpilot::app::options::CopilotOptions;
use flowpilot::models::intent::IntentPattern;
use flowpilot::security::SecurityScanner;

use common::{field, sample_snapshot};

fn adapter_for(snapshot: EditorSnapshot) -> Arc<EditorAdapter<SnapshotDriver>> {
    let driver = Arc::new(SnapshotDriver::new(snapshot));
    let scanner = Arc::new(SecurityScanner::new().unwrap());
    Arc::new(EditorAdapter::new(driver, scanner, &CopilotOptions::default()))
}

#[tokio::test]
async fn test_registry_detects_editor_page() {
    let mut elsewhere = sample_snapshot();
    elsewhere.platform = "make".to_string();
    elsewhere.url = Some("https://make.example.com/scenarios".to_string());

    let mut registry = AdapterRegistry::new();
    registry.register(adapter_for(elsewhere));
    registry.register(adapter_for(sample_snapshot()));
    assert_eq!(registry.platforms(), vec!["make", "n8n"]);

    let found = registry.detect().await.unwrap();
    assert_eq!(found.platform_name(), "n8n");
    assert!(registry.get("zapier").is_none());
}

#[tokio::test]
async fn test_fill_settings_applies_to_open_node() {
    let adapter = adapter_for(sample_snapshot());
    let change = json!({
        "action": "fill_settings",
        "settings": {"url": "https://api.example.com/v2/orders", "unknownField": 1}
    });

    let result = adapter.apply_changes(&change).await;
    assert!(result.success);
    assert_eq!(result.filled_count, Some(1));

    let snapshot = adapter.driver().snapshot().await;
    assert_eq!(snapshot.settings["call"][0].value, json!("https://api.example.com/v2/orders"));
}

#[tokio::test]
async fn test_unsafe_change_is_never_applied() {
    let adapter = adapter_for(sample_snapshot());
    let change = json!({
        "action": "fill_settings",
        "settings": {"url": "https://api.example.com?key=sk-abcdefghijklmnopqrstuvwx"}
    });

    let result = adapter.apply_changes(&change).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("security_violation"));
    assert_eq!(result.issues[0].issue_type, "hardcoded_api_key");

    let snapshot = adapter.driver().snapshot().await;
    assert_eq!(snapshot.settings["call"][0].value, json!("https://api.example.com/orders"));
}

#[tokio::test]
async fn test_create_node_invalidates_flows() {
    let adapter = adapter_for(sample_snapshot());
    adapter.trace_data_flow("call").await;
    assert_eq!(adapter.tracer().cached_nodes().len(), 1);

    let change = json!({"action": "create_node", "nodeType": "Set", "settings": {"keepOnlySet": true}});
    let result = adapter.apply_changes(&change).await;
    assert!(result.success);
    assert!(adapter.tracer().cached_nodes().is_empty());
    assert_eq!(adapter.get_workflow_structure().await.node_count, 5);
}

#[tokio::test]
async fn test_unsupported_operations_fail_softly() {
    let adapter = adapter_for(sample_snapshot());

    let fix = adapter
        .apply_changes(&json!({"action": "fix_error", "fix": {"node": "call"}}))
        .await;
    assert!(!fix.success);
    assert!(!fix.message.is_empty());

    let unknown = adapter.apply_changes(&json!({"action": "rename"})).await;
    assert!(!unknown.success);
}

#[tokio::test]
async fn test_validate_security_scans_open_node() {
    let adapter = adapter_for(sample_snapshot());
    let status = adapter.validate_security().await;
    assert!(status.safe);
    assert_eq!(status.score, Some(100));

    let mut leaky = sample_snapshot();
    if let Some(fields) = leaky.settings.get_mut("call") {
        fields.push(field("Header Value", json!("Bearer abcdefghijklmnopqrstuvwxyz")));
    }
    let status = adapter_for(leaky).validate_security().await;
    assert!(!status.safe);
    assert_eq!(status.score, Some(60));
}

#[tokio::test]
async fn test_intent_and_errors_through_adapter() {
    let adapter = adapter_for(sample_snapshot());

    let intent = adapter.infer_business_intent().await;
    assert_eq!(intent.pattern, IntentPattern::WebhookToNotification);
    assert!((intent.confidence - 2.0 / 3.0).abs() < 1e-9);

    let report = adapter.detect_errors().await;
    assert_eq!(report.current.len(), 1);
}
