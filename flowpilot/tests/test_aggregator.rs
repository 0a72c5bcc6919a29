//! Context aggregator integration tests

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use flowpilot::adapter::snapshot::SnapshotDriver;
use flowpilot::adapter::EditorDriver;
use flowpilot::context::{self, ContextAggregator};
use flowpilot::errors::CopilotError;
use flowpilot::models::diagnostics::{ErrorCause, RawError};
use flowpilot::models::flow::ValueKind;
use flowpilot::models::intent::IntentPattern;
use flowpilot::models::workflow::{ExecutionRecord, NodeRef, WorkflowStructure};
use flowpilot::tracer::{self, DataFlowTracer};

use common::{sample_snapshot, sample_workflow};

fn aggregator_for<D: EditorDriver>(driver: D, history_size: usize) -> ContextAggregator<D> {
    let driver = Arc::new(driver);
    let tracer = Arc::new(DataFlowTracer::new(driver.clone(), &tracer::Options::default()));
    ContextAggregator::new(driver, tracer, &context::Options { history_size })
}

#[tokio::test]
async fn test_full_context_from_snapshot() {
    let aggregator = aggregator_for(SnapshotDriver::new(sample_snapshot()), 10);

    let ctx = aggregator.collect_full_context().await;
    assert!(!ctx.error);
    assert_eq!(ctx.platform, "n8n");
    assert_eq!(ctx.current.selected_node.as_ref().map(|n| n.id.as_str()), Some("call"));
    assert_eq!(ctx.current.settings.len(), 2);

    assert_eq!(ctx.workflow.structure.node_count, 4);
    assert_eq!(ctx.workflow.business_intent.pattern, IntentPattern::WebhookToNotification);
    let flow = ctx.workflow.data_flow.as_ref().unwrap();
    assert_eq!(flow.target_node_id, "call");

    assert_eq!(ctx.types.input_schema.get("customer"), Some(&ValueKind::String));
    assert_eq!(ctx.types.output_schema.get("statusCode"), Some(&ValueKind::Number));

    assert_eq!(ctx.errors.report.current.len(), 1);
    let root = ctx.errors.report.root_cause.as_ref().unwrap();
    assert_eq!(root.cause, ErrorCause::NetworkTimeout);
}

#[tokio::test]
async fn test_root_cause_is_most_frequent() {
    let mut snapshot = sample_snapshot();
    snapshot.errors = vec![
        RawError::new("401 Unauthorized").on_node("call"),
        RawError::new("Request timeout after 30s").on_node("notify"),
        RawError::new("401 Unauthorized").on_node("call"),
        RawError::new("Unauthorized: token expired").on_node("map"),
    ];
    let aggregator = aggregator_for(SnapshotDriver::new(snapshot), 10);

    let report = aggregator.detect_errors().await;
    let root = report.root_cause.unwrap();
    assert_eq!(root.cause, ErrorCause::AuthenticationFailure);
    assert_eq!(root.frequency, 3);
    assert_eq!(root.affected_nodes, vec!["call", "call", "map"]);
}

#[tokio::test]
async fn test_history_is_capped_and_most_recent_first() {
    let aggregator = aggregator_for(SnapshotDriver::new(sample_snapshot()), 2);

    let first = aggregator.collect_full_context().await;
    let second = aggregator.collect_full_context().await;
    let third = aggregator.collect_full_context().await;

    assert_eq!(first.user.total_collections, 0);
    assert_eq!(third.user.recent_contexts.len(), 2);
    assert_eq!(third.user.recent_contexts[0].id, second.id);

    let history = aggregator.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, third.id);
    assert_eq!(history[1].id, second.id);

    aggregator.clear_history();
    assert!(aggregator.history().is_empty());
}

#[tokio::test]
async fn test_execution_facet() {
    let mut snapshot = sample_snapshot();
    snapshot.executions = vec![
        ExecutionRecord {
            id: "e3".to_string(),
            success: false,
            finished_at: None,
        },
        ExecutionRecord {
            id: "e2".to_string(),
            success: true,
            finished_at: None,
        },
        ExecutionRecord {
            id: "e1".to_string(),
            success: true,
            finished_at: None,
        },
        ExecutionRecord {
            id: "e0".to_string(),
            success: true,
            finished_at: None,
        },
    ];
    let aggregator = aggregator_for(SnapshotDriver::new(snapshot), 10);

    let ctx = aggregator.collect_full_context().await;
    assert_eq!(ctx.execution.execution_count, 4);
    assert_eq!(ctx.execution.success_rate, 0.75);
    assert_eq!(ctx.execution.last_execution.unwrap().id, "e3");
}

/// Driver whose error source panics and whose history source fails
struct FlakyDriver;

#[async_trait]
impl EditorDriver for FlakyDriver {
    fn platform_name(&self) -> &str {
        "flaky"
    }

    async fn detect_platform_page(&self) -> bool {
        true
    }

    async fn workflow_structure(&self) -> Result<WorkflowStructure, CopilotError> {
        Ok(sample_workflow())
    }

    async fn raw_errors(&self) -> Result<Vec<RawError>, CopilotError> {
        panic!("error panel detached");
    }

    async fn fill_settings(&self, _settings: &Map<String, Value>) -> Result<usize, CopilotError> {
        Ok(0)
    }

    async fn current_node(&self) -> Result<Option<NodeRef>, CopilotError> {
        Err(CopilotError::AdapterError("no settings panel".to_string()))
    }

    async fn execution_history(&self) -> Result<Vec<ExecutionRecord>, CopilotError> {
        Err(CopilotError::AdapterError("history unavailable".to_string()))
    }
}

#[tokio::test]
async fn test_failing_facets_degrade_to_empty() {
    let aggregator = aggregator_for(FlakyDriver, 10);

    let ctx = aggregator.collect_full_context().await;
    assert!(!ctx.error);
    assert_eq!(ctx.platform, "flaky");

    assert!(ctx.current.selected_node.is_none());
    assert!(ctx.errors.report.current.is_empty());
    assert!(ctx.errors.report.root_cause.is_none());
    assert_eq!(ctx.execution.execution_count, 0);

    assert_eq!(ctx.workflow.structure.node_count, 4);
    assert!(ctx.workflow.data_flow.is_none());
    assert!(ctx.types.output_schema.is_empty());

    assert_eq!(aggregator.history().len(), 1);
}

#[tokio::test]
async fn test_intent_unknown_when_structure_unavailable() {
    let mut snapshot = sample_snapshot();
    snapshot.workflow = WorkflowStructure::default();
    let aggregator = aggregator_for(SnapshotDriver::new(snapshot), 10);

    let intent = aggregator.infer_business_intent().await;
    assert_eq!(intent.pattern, IntentPattern::Unknown);
    assert_eq!(intent.node_count, 0);
}
