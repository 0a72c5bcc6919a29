//! Aggregated context snapshot

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::diagnostics::{ErrorReport, ErrorType};
use crate::models::flow::{DataFlow, FieldType, ValueKind};
use crate::models::intent::{BusinessIntent, Complexity, IntentPattern, StructuralPattern};
use crate::models::security::ScanContext;
use crate::models::workflow::{CredentialRef, ExecutionRecord, FieldInfo, NodeRef, WorkflowStructure};

/// Everything known about the editor at one point in time.
///
/// Plain data only: a context can be serialized and sent across a process
/// boundary unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub id: String,
    pub timestamp: String,
    pub platform: String,
    #[serde(default)]
    pub current: CurrentFacet,
    #[serde(default)]
    pub workflow: WorkflowFacet,
    #[serde(default)]
    pub errors: ErrorFacet,
    #[serde(default)]
    pub security: SecurityFacet,
    #[serde(default)]
    pub types: TypeFacet,
    #[serde(default)]
    pub execution: ExecutionFacet,
    #[serde(default)]
    pub user: UserFacet,
    /// Set when collection failed as a whole
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Context {
    /// Fallback context reported when collection fails as a whole
    pub fn minimal(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: crate::utils::generate_uuid(),
            timestamp: crate::utils::now_iso(),
            platform: platform.into(),
            error: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            id: self.id.clone(),
            timestamp: self.timestamp.clone(),
            selected_node_id: self.current.selected_node.as_ref().map(|n| n.id.clone()),
            error_count: self.errors.report.current.len(),
            intent: self.workflow.business_intent.pattern,
        }
    }

    /// Facts the security gate needs from this context
    pub fn scan_context(&self) -> ScanContext {
        ScanContext {
            user_explicitly_requested: self.security.user_explicitly_requested,
            existing_credentials: self.security.existing_credentials.clone(),
        }
    }
}

/// What the user is looking at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentFacet {
    pub selected_node: Option<NodeRef>,
    pub settings: Vec<FieldInfo>,
}

/// The workflow as a whole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFacet {
    pub structure: WorkflowStructure,
    pub business_intent: BusinessIntent,
    pub complexity: Complexity,
    pub patterns: Vec<StructuralPattern>,
    /// Flow into the selected node, when one is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_flow: Option<DataFlow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFacet {
    #[serde(flatten)]
    pub report: ErrorReport,
    /// Number of current errors per type
    pub frequency: BTreeMap<ErrorType, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFacet {
    pub existing_credentials: Vec<CredentialRef>,
    /// Names of settings fields that hold secrets
    pub sensitive_fields: Vec<String>,
    pub user_explicitly_requested: bool,
}

/// Inferred input and output types of the selected node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeFacet {
    pub input_schema: BTreeMap<String, ValueKind>,
    pub output_schema: BTreeMap<String, ValueKind>,
    pub data_types: DataTypes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTypes {
    pub input: Vec<FieldType>,
    pub output: Vec<FieldType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFacet {
    pub last_execution: Option<ExecutionRecord>,
    pub execution_count: usize,
    pub success_rate: f64,
}

/// Recent collection history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFacet {
    pub recent_contexts: Vec<ContextSummary>,
    pub total_collections: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    pub id: String,
    pub timestamp: String,
    pub selected_node_id: Option<String>,
    pub error_count: usize,
    pub intent: IntentPattern,
}
