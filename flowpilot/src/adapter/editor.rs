//! [`PlatformAdapter`] built from an [`EditorDriver`]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::adapter::{EditorDriver, PlatformAdapter};
use crate::app::options::CopilotOptions;
use crate::context::{settings_map, ContextAggregator};
use crate::errors::CopilotError;
use crate::models::change::{ApplyResult, ChangeRequest};
use crate::models::context::Context;
use crate::models::diagnostics::ErrorReport;
use crate::models::flow::DataFlow;
use crate::models::intent::BusinessIntent;
use crate::models::security::{ScanContext, SecurityStatus};
use crate::models::workflow::WorkflowStructure;
use crate::security::{summarize, SecurityScanner};
use crate::tracer::DataFlowTracer;

/// Editor-agnostic adapter: the driver supplies raw facts, everything else
/// is computed here
pub struct EditorAdapter<D: EditorDriver> {
    driver: Arc<D>,
    tracer: Arc<DataFlowTracer<D>>,
    aggregator: ContextAggregator<D>,
    scanner: Arc<SecurityScanner>,
}

impl<D: EditorDriver> EditorAdapter<D> {
    pub fn new(driver: Arc<D>, scanner: Arc<SecurityScanner>, options: &CopilotOptions) -> Self {
        let tracer = Arc::new(DataFlowTracer::new(driver.clone(), &options.tracer));
        let aggregator = ContextAggregator::new(driver.clone(), tracer.clone(), &options.aggregator);
        Self {
            driver,
            tracer,
            aggregator,
            scanner,
        }
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn tracer(&self) -> &DataFlowTracer<D> {
        &self.tracer
    }

    pub fn aggregator(&self) -> &ContextAggregator<D> {
        &self.aggregator
    }

    /// Facts the security gate needs, read directly from the driver
    async fn scan_context(&self) -> ScanContext {
        let existing_credentials = self.driver.existing_credentials().await.unwrap_or_else(|e| {
            warn!("Failed to read credentials: {}", e);
            Vec::new()
        });
        ScanContext {
            user_explicitly_requested: self.driver.user_explicitly_requested().await,
            existing_credentials,
        }
    }

    async fn dispatch(&self, request: ChangeRequest) -> Result<ApplyResult, CopilotError> {
        match request {
            ChangeRequest::FillSettings(settings) => {
                let filled = self.driver.fill_settings(&settings).await?;
                Ok(ApplyResult::filled(filled))
            }
            ChangeRequest::CreateNode { node_type, settings } => {
                let node = self.driver.create_node(&node_type, &settings).await?;
                // the graph changed under every cached flow
                self.tracer.clear_cache();
                Ok(ApplyResult::succeeded(format!("Created node '{}' ({})", node.name, node.id)))
            }
            ChangeRequest::FixError(fix) => {
                self.driver.fix_error(&fix).await?;
                self.tracer.clear_cache();
                Ok(ApplyResult::succeeded("Fix applied"))
            }
            ChangeRequest::Unknown(action) => Ok(ApplyResult::failed(format!("Unknown action '{}'", action))),
        }
    }

    async fn current_settings_status(&self) -> Result<SecurityStatus, CopilotError> {
        let Some(node) = self.driver.current_node().await? else {
            return Ok(SecurityStatus {
                safe: true,
                message: "No node selected".to_string(),
                score: None,
            });
        };
        let settings = self.driver.node_settings(&node.id).await?;
        let change = json!({ "settings": Value::Object(settings_map(&settings)) });
        let result = self
            .scanner
            .validate_ai_response(&change, &self.scan_context().await);

        Ok(SecurityStatus {
            safe: result.safe,
            message: summarize(&result),
            score: Some(result.score),
        })
    }
}

#[async_trait]
impl<D: EditorDriver + 'static> PlatformAdapter for EditorAdapter<D> {
    fn platform_name(&self) -> &str {
        self.driver.platform_name()
    }

    async fn detect_platform_page(&self) -> bool {
        self.driver.detect_platform_page().await
    }

    async fn get_context(&self) -> Context {
        self.aggregator.collect_full_context().await
    }

    async fn get_workflow_structure(&self) -> WorkflowStructure {
        self.driver.workflow_structure().await.unwrap_or_else(|e| {
            warn!("Failed to read workflow structure: {}", e);
            WorkflowStructure::default()
        })
    }

    async fn detect_errors(&self) -> ErrorReport {
        self.aggregator.detect_errors().await
    }

    async fn trace_data_flow(&self, node_id: &str) -> Arc<DataFlow> {
        self.tracer.trace_data_flow(node_id).await
    }

    async fn infer_business_intent(&self) -> BusinessIntent {
        self.aggregator.infer_business_intent().await
    }

    async fn apply_changes(&self, change: &Value) -> ApplyResult {
        let verdict = self
            .scanner
            .validate_ai_response(change, &self.scan_context().await);
        if !verdict.safe {
            warn!("Change rejected by security gate: {}", summarize(&verdict));
            return ApplyResult::security_violation(verdict.issues, verdict.score);
        }

        match self.dispatch(ChangeRequest::from_value(change)).await {
            Ok(result) => {
                info!("Change applied: {}", result.message);
                result
            }
            Err(CopilotError::NotImplemented(message)) => ApplyResult::failed(message),
            Err(e) => {
                warn!("Failed to apply change: {}", e);
                ApplyResult::failed(e.to_string())
            }
        }
    }

    async fn validate_security(&self) -> SecurityStatus {
        self.current_settings_status().await.unwrap_or_else(|e| {
            warn!("Security validation failed: {}", e);
            SecurityStatus {
                safe: false,
                message: format!("Could not read the current node: {}", e),
                score: None,
            }
        })
    }
}
