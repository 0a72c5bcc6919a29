//! In-memory editor driver backed by a serialized editor snapshot.
//!
//! Used by the command line tool and by tests; a browser-side integration
//! would produce the same snapshot format.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::adapter::EditorDriver;
use crate::errors::CopilotError;
use crate::guide::observer::ViewSource;
use crate::guide::predicates::EditorView;
use crate::models::diagnostics::RawError;
use crate::models::workflow::{
    CredentialRef, ExecutionRecord, FieldInfo, NodeOutput, NodeRef, WorkflowStructure,
};
use crate::utils::{contains_ci, generate_uuid};

fn default_platform() -> String {
    "n8n".to_string()
}

/// Everything an editor integration can observe at one moment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub workflow: WorkflowStructure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node_id: Option<String>,
    /// Settings fields per node id
    #[serde(default)]
    pub settings: BTreeMap<String, Vec<FieldInfo>>,
    /// Last output per node id
    #[serde(default)]
    pub outputs: BTreeMap<String, NodeOutput>,
    #[serde(default)]
    pub errors: Vec<RawError>,
    #[serde(default)]
    pub credentials: Vec<CredentialRef>,
    /// Most recent first
    #[serde(default)]
    pub executions: Vec<ExecutionRecord>,
    #[serde(default)]
    pub user_explicitly_requested: bool,
    #[serde(default)]
    pub view: EditorView,
}

impl EditorSnapshot {
    /// Whether the snapshot was taken on a workflow editor page
    pub fn is_editor_page(&self) -> bool {
        match &self.url {
            Some(url) => url.contains("/workflow"),
            None => !self.workflow.nodes.is_empty(),
        }
    }
}

pub struct SnapshotDriver {
    platform: String,
    snapshot: RwLock<EditorSnapshot>,
}

impl SnapshotDriver {
    pub fn new(snapshot: EditorSnapshot) -> Self {
        Self {
            platform: snapshot.platform.clone(),
            snapshot: RwLock::new(snapshot),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, CopilotError> {
        info!("Loading editor snapshot from {}", path.display());
        let json = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(serde_json::from_str(&json)?))
    }

    pub async fn snapshot(&self) -> EditorSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Mutate the snapshot in place, as an editor change would
    pub async fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut EditorSnapshot),
    {
        let mut snapshot = self.snapshot.write().await;
        change(&mut snapshot);
    }
}

#[async_trait]
impl EditorDriver for SnapshotDriver {
    fn platform_name(&self) -> &str {
        &self.platform
    }

    async fn detect_platform_page(&self) -> bool {
        self.snapshot.read().await.is_editor_page()
    }

    async fn workflow_structure(&self) -> Result<WorkflowStructure, CopilotError> {
        let snapshot = self.snapshot.read().await;
        let mut structure = snapshot.workflow.clone();
        structure.node_count = structure.nodes.len();
        Ok(structure)
    }

    async fn raw_errors(&self) -> Result<Vec<RawError>, CopilotError> {
        Ok(self.snapshot.read().await.errors.clone())
    }

    /// Fill each setting into the first field of the open node whose name
    /// contains the setting name
    async fn fill_settings(&self, settings: &Map<String, Value>) -> Result<usize, CopilotError> {
        let mut snapshot = self.snapshot.write().await;
        let node_id = snapshot
            .selected_node_id
            .clone()
            .ok_or_else(|| CopilotError::AdapterError("no node is open".to_string()))?;
        let fields = snapshot.settings.entry(node_id).or_default();

        let mut filled = 0;
        for (name, value) in settings {
            if let Some(field) = fields.iter_mut().find(|f| contains_ci(&f.name, name)) {
                debug!("Filling field '{}'", field.name);
                field.value = value.clone();
                filled += 1;
            }
        }
        Ok(filled)
    }

    async fn current_node(&self) -> Result<Option<NodeRef>, CopilotError> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .selected_node_id
            .as_deref()
            .and_then(|id| snapshot.workflow.node(id))
            .cloned())
    }

    async fn node_settings(&self, node_id: &str) -> Result<Vec<FieldInfo>, CopilotError> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.settings.get(node_id).cloned().unwrap_or_default())
    }

    async fn node_last_output(&self, node_id: &str) -> Result<NodeOutput, CopilotError> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .outputs
            .get(node_id)
            .cloned()
            .ok_or_else(|| CopilotError::NotFound(format!("no output recorded for '{}'", node_id)))
    }

    async fn existing_credentials(&self) -> Result<Vec<CredentialRef>, CopilotError> {
        Ok(self.snapshot.read().await.credentials.clone())
    }

    async fn execution_history(&self) -> Result<Vec<ExecutionRecord>, CopilotError> {
        Ok(self.snapshot.read().await.executions.clone())
    }

    async fn user_explicitly_requested(&self) -> bool {
        self.snapshot.read().await.user_explicitly_requested
    }

    async fn create_node(&self, node_type: &str, settings: &Map<String, Value>) -> Result<NodeRef, CopilotError> {
        let mut snapshot = self.snapshot.write().await;
        let node = NodeRef::new(generate_uuid(), node_type, node_type);
        let fields = settings
            .iter()
            .map(|(name, value)| FieldInfo {
                name: name.clone(),
                value: value.clone(),
                field_type: None,
            })
            .collect();

        snapshot.workflow.nodes.push(node.clone());
        snapshot.workflow.node_count = snapshot.workflow.nodes.len();
        snapshot.settings.insert(node.id.clone(), fields);
        Ok(node)
    }
}

#[async_trait]
impl ViewSource for SnapshotDriver {
    async fn current_view(&self) -> EditorView {
        self.snapshot.read().await.view.clone()
    }
}
