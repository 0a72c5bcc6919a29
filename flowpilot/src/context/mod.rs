//! Context aggregation.
//!
//! Builds one [`Context`] per request from the editor driver, the data-flow
//! tracer and the local heuristics. Collection never fails: a facet that
//! errors or panics is replaced by its empty value, and a failure of the
//! whole collection yields [`Context::minimal`].

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::adapter::EditorDriver;
use crate::analysis::errors::{build_error_report, error_frequency};
use crate::analysis::intent::{analyze_complexity, detect_structural_patterns, infer_business_intent};
use crate::analysis::schema::{expected_output_schema, field_types, merge_fields, sensitive_field_names};
use crate::errors::CopilotError;
use crate::models::context::{
    Context, ContextSummary, CurrentFacet, DataTypes, ErrorFacet, ExecutionFacet, SecurityFacet,
    TypeFacet, UserFacet, WorkflowFacet,
};
use crate::models::diagnostics::ErrorReport;
use crate::models::flow::DataFlow;
use crate::models::intent::BusinessIntent;
use crate::models::workflow::{FieldInfo, NodeRef};
use crate::tracer::DataFlowTracer;
use crate::utils::{generate_uuid, now_iso};

/// Number of history entries exposed in the user facet
const RECENT_CONTEXTS: usize = 3;

/// Aggregator options
#[derive(Debug, Clone)]
pub struct Options {
    /// Number of past collections remembered
    pub history_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { history_size: 10 }
    }
}

/// Run one facet collector, substituting the empty facet on error or panic
async fn guarded<T, F>(facet: &str, collector: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, CopilotError>>,
{
    match AssertUnwindSafe(collector).catch_unwind().await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            warn!("Failed to collect {} context: {}", facet, e);
            T::default()
        }
        Err(_) => {
            error!("Collector for {} context panicked", facet);
            T::default()
        }
    }
}

/// Settings fields as a name to value map
pub fn settings_map(fields: &[FieldInfo]) -> Map<String, Value> {
    fields
        .iter()
        .map(|f| (f.name.clone(), f.value.clone()))
        .collect()
}

pub struct ContextAggregator<D: EditorDriver> {
    driver: Arc<D>,
    tracer: Arc<DataFlowTracer<D>>,
    history: Mutex<VecDeque<ContextSummary>>,
    history_size: usize,
}

impl<D: EditorDriver> ContextAggregator<D> {
    pub fn new(driver: Arc<D>, tracer: Arc<DataFlowTracer<D>>, options: &Options) -> Self {
        Self {
            driver,
            tracer,
            history: Mutex::new(VecDeque::with_capacity(options.history_size)),
            history_size: options.history_size,
        }
    }

    /// Collect a full context snapshot and remember it in the history
    pub async fn collect_full_context(&self) -> Context {
        let platform = self.driver.platform_name().to_string();

        match AssertUnwindSafe(self.collect(platform.clone())).catch_unwind().await {
            Ok(context) => {
                self.remember(&context);
                debug!(
                    "Collected context {} ({} node(s), {} error(s))",
                    context.id,
                    context.workflow.structure.nodes.len(),
                    context.errors.report.current.len()
                );
                context
            }
            Err(_) => {
                error!("Context collection failed");
                Context::minimal(platform, "Context collection failed, only minimal information is available")
            }
        }
    }

    /// Past collections, most recent first
    pub fn history(&self) -> Vec<ContextSummary> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.clear();
    }

    /// Intent of the current workflow, unknown when the structure is unavailable
    pub async fn infer_business_intent(&self) -> BusinessIntent {
        guarded("intent", async {
            let structure = self.driver.workflow_structure().await?;
            Ok::<_, CopilotError>(infer_business_intent(&structure))
        })
        .await
    }

    /// Current errors with their chain and root cause
    pub async fn detect_errors(&self) -> ErrorReport {
        guarded("error", self.error_facet()).await.report
    }

    async fn collect(&self, platform: String) -> Context {
        let current = guarded("current", self.current_facet()).await;
        let selected = current.selected_node.clone();

        let (workflow, errors, security, execution) = futures::join!(
            guarded("workflow", self.workflow_facet(selected.as_ref())),
            guarded("error", self.error_facet()),
            guarded("security", self.security_facet(&current.settings)),
            guarded("execution", self.execution_facet()),
        );

        let types = guarded("type", async {
            Ok::<_, CopilotError>(type_facet(selected.as_ref(), workflow.data_flow.as_ref()))
        })
        .await;

        Context {
            id: generate_uuid(),
            timestamp: now_iso(),
            platform,
            current,
            workflow,
            errors,
            security,
            types,
            execution,
            user: self.user_facet(),
            error: false,
            message: None,
        }
    }

    async fn current_facet(&self) -> Result<CurrentFacet, CopilotError> {
        let selected_node = self.driver.current_node().await?;
        let settings = match &selected_node {
            Some(node) => self.driver.node_settings(&node.id).await?,
            None => Vec::new(),
        };
        Ok(CurrentFacet {
            selected_node,
            settings,
        })
    }

    async fn workflow_facet(&self, selected: Option<&NodeRef>) -> Result<WorkflowFacet, CopilotError> {
        let structure = self.driver.workflow_structure().await?;
        let data_flow = match selected {
            Some(node) => Some(DataFlow::clone(&*self.tracer.trace_data_flow(&node.id).await)),
            None => None,
        };

        Ok(WorkflowFacet {
            business_intent: infer_business_intent(&structure),
            complexity: analyze_complexity(&structure),
            patterns: detect_structural_patterns(&structure),
            structure,
            data_flow,
        })
    }

    async fn error_facet(&self) -> Result<ErrorFacet, CopilotError> {
        let raw = self.driver.raw_errors().await?;
        let report = build_error_report(&raw);
        Ok(ErrorFacet {
            frequency: error_frequency(&report.current),
            report,
        })
    }

    async fn security_facet(&self, settings: &[FieldInfo]) -> Result<SecurityFacet, CopilotError> {
        Ok(SecurityFacet {
            existing_credentials: self.driver.existing_credentials().await?,
            sensitive_fields: sensitive_field_names(&settings_map(settings)),
            user_explicitly_requested: self.driver.user_explicitly_requested().await,
        })
    }

    async fn execution_facet(&self) -> Result<ExecutionFacet, CopilotError> {
        let executions = self.driver.execution_history().await?;
        let succeeded = executions.iter().filter(|e| e.success).count();
        let success_rate = if executions.is_empty() {
            0.0
        } else {
            succeeded as f64 / executions.len() as f64
        };

        Ok(ExecutionFacet {
            last_execution: executions.first().cloned(),
            execution_count: executions.len(),
            success_rate,
        })
    }

    fn user_facet(&self) -> UserFacet {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        UserFacet {
            recent_contexts: history.iter().take(RECENT_CONTEXTS).cloned().collect(),
            total_collections: history.len(),
        }
    }

    fn remember(&self, context: &Context) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push_front(context.summary());
        history.truncate(self.history_size);
    }
}

/// Input types merged from the flow's predecessor outputs, output types from
/// the node type
fn type_facet(selected: Option<&NodeRef>, flow: Option<&DataFlow>) -> TypeFacet {
    let Some(node) = selected else {
        return TypeFacet::default();
    };

    let input_schema = flow
        .map(|f| merge_fields(f.previous_outputs.iter().filter_map(|o| o.schema.as_ref())))
        .unwrap_or_default();
    let output_schema = expected_output_schema(&node.node_type);

    TypeFacet {
        data_types: DataTypes {
            input: field_types(&input_schema),
            output: field_types(&output_schema),
        },
        input_schema,
        output_schema,
    }
}
