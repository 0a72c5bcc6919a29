//! Platform abstraction.
//!
//! [`PlatformAdapter`] is the capability set the rest of the system consumes.
//! [`EditorDriver`] is the smaller set of raw editor facts a concrete editor
//! integration provides; [`editor::EditorAdapter`] builds the former from the
//! latter.

pub mod editor;
pub mod snapshot;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::CopilotError;
use crate::models::change::ApplyResult;
use crate::models::context::Context;
use crate::models::diagnostics::{ErrorReport, RawError};
use crate::models::flow::DataFlow;
use crate::models::intent::BusinessIntent;
use crate::models::security::SecurityStatus;
use crate::models::workflow::{
    CredentialRef, ExecutionRecord, FieldInfo, NodeOutput, NodeRef, WorkflowStructure,
};

/// The eight queries every editor integration answers.
///
/// None of these fail: problems degrade to empty or neutral values.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Registry key, e.g. "n8n"
    fn platform_name(&self) -> &str;

    /// Whether the current page is an editor page of this platform
    async fn detect_platform_page(&self) -> bool;

    async fn get_context(&self) -> Context;

    async fn get_workflow_structure(&self) -> WorkflowStructure;

    async fn detect_errors(&self) -> ErrorReport;

    async fn trace_data_flow(&self, node_id: &str) -> Arc<DataFlow>;

    async fn infer_business_intent(&self) -> BusinessIntent;

    /// Gate `change` through the security scanner, then apply it
    async fn apply_changes(&self, change: &Value) -> ApplyResult;

    async fn validate_security(&self) -> SecurityStatus;
}

/// Raw facts read from, and edits written to, one concrete editor.
///
/// Only the first five methods are required. The rest default to "nothing
/// known" or to "not implemented" for writes.
#[async_trait]
pub trait EditorDriver: Send + Sync {
    fn platform_name(&self) -> &str;

    async fn detect_platform_page(&self) -> bool;

    async fn workflow_structure(&self) -> Result<WorkflowStructure, CopilotError>;

    /// Errors currently displayed by the editor
    async fn raw_errors(&self) -> Result<Vec<RawError>, CopilotError>;

    /// Write settings into the open node, returning the number of fields filled
    async fn fill_settings(&self, settings: &Map<String, Value>) -> Result<usize, CopilotError>;

    async fn current_node(&self) -> Result<Option<NodeRef>, CopilotError> {
        Ok(None)
    }

    async fn node_settings(&self, _node_id: &str) -> Result<Vec<FieldInfo>, CopilotError> {
        Ok(Vec::new())
    }

    async fn node_last_output(&self, _node_id: &str) -> Result<NodeOutput, CopilotError> {
        Ok(NodeOutput::default())
    }

    async fn existing_credentials(&self) -> Result<Vec<CredentialRef>, CopilotError> {
        Ok(Vec::new())
    }

    /// Past executions, most recent first
    async fn execution_history(&self) -> Result<Vec<ExecutionRecord>, CopilotError> {
        Ok(Vec::new())
    }

    /// Whether the user explicitly asked for a destructive operation
    async fn user_explicitly_requested(&self) -> bool {
        false
    }

    async fn create_node(
        &self,
        node_type: &str,
        _settings: &Map<String, Value>,
    ) -> Result<NodeRef, CopilotError> {
        Err(CopilotError::NotImplemented(format!(
            "creating '{}' nodes is not supported on {}",
            node_type,
            self.platform_name()
        )))
    }

    async fn fix_error(&self, _fix: &Value) -> Result<(), CopilotError> {
        Err(CopilotError::NotImplemented(format!(
            "automatic error fixes are not supported on {}",
            self.platform_name()
        )))
    }
}

/// Adapters keyed by platform name
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any previous one with the same name
    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        let name = adapter.platform_name().to_string();
        debug!("Registering adapter for platform '{}'", name);
        self.adapters.insert(name, adapter);
    }

    pub fn get(&self, platform: &str) -> Option<Arc<dyn PlatformAdapter>> {
        self.adapters.get(platform).cloned()
    }

    pub fn platforms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    /// First adapter (by platform name) that recognizes the current page
    pub async fn detect(&self) -> Option<Arc<dyn PlatformAdapter>> {
        for name in self.platforms() {
            if let Some(adapter) = self.adapters.get(&name) {
                if adapter.detect_platform_page().await {
                    return Some(adapter.clone());
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
