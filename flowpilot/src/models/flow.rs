//! Data-flow models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::workflow::NodeRef;

/// How data reaches one target node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFlow {
    pub target_node_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub path: Vec<PathInfo>,
    #[serde(default)]
    pub previous_outputs: Vec<OutputInfo>,
    #[serde(default)]
    pub transformations: Vec<TransformInfo>,
    #[serde(default)]
    pub type_chain: Vec<TypeChainEntry>,
    #[serde(default)]
    pub validation: FlowValidation,
    /// Set when tracing failed and only the target id is known
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DataFlow {
    /// Fallback flow reported when tracing fails
    pub fn minimal(target_node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target_node_id: target_node_id.into(),
            timestamp: crate::utils::now_iso(),
            path: Vec::new(),
            previous_outputs: Vec::new(),
            transformations: Vec::new(),
            type_chain: Vec::new(),
            validation: FlowValidation::default(),
            error: true,
            message: Some(message.into()),
        }
    }
}

/// One directed path from a start node to the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathInfo {
    pub nodes: Vec<String>,
    pub length: usize,
    pub complexity: f64,
}

/// JSON shape of a sampled value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    Any,
}

impl ValueKind {
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(_) => ValueKind::String,
            serde_json::Value::Number(_) => ValueKind::Number,
            serde_json::Value::Bool(_) => ValueKind::Boolean,
            serde_json::Value::Object(_) => ValueKind::Object,
            serde_json::Value::Array(_) => ValueKind::Array,
            serde_json::Value::Null => ValueKind::Null,
        }
    }
}

/// Best-effort schema inferred from a sampled output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Shape of the sampled value itself
    pub kind: ValueKind,
    /// Field name to shape, when the sample is an object
    #[serde(default)]
    pub fields: BTreeMap<String, ValueKind>,
}

/// Last known output of a predecessor node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputInfo {
    pub node_id: String,
    pub node_name: String,
    pub node_type: String,
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<OutputSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Category of a transformation between two consecutive nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationKind {
    CodeTransformation,
    FieldMapping,
    ConditionalRouting,
    DataMerge,
    DataSplit,
    DataFilter,
    ApiToDatabase,
    FormToNotification,
    DirectPass,
    Unknown,
}

/// Estimated field-level changes across one transformation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChanges {
    pub fields_added: Vec<String>,
    pub fields_removed: Vec<String>,
    pub fields_transformed: Vec<String>,
}

/// One step of the shortest path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformInfo {
    pub from: NodeRef,
    pub to: NodeRef,
    pub transformation_type: TransformationKind,
    pub data_changes: DataChanges,
}

/// A field and its inferred shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

/// Schema of one predecessor in the type chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeChainEntry {
    pub node_id: String,
    pub node_name: String,
    pub schema: OutputSchema,
    pub types: Vec<FieldType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowIssueSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowIssueKind {
    NoInput,
    NullInput,
    TypeMismatch,
}

/// A problem found while validating a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowIssue {
    pub severity: FlowIssueSeverity,
    #[serde(rename = "type")]
    pub kind: FlowIssueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
    pub suggestion: String,
}

/// Validation verdict for a traced flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowValidation {
    pub valid: bool,
    pub issues: Vec<FlowIssue>,
}

impl Default for FlowValidation {
    fn default() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
        }
    }
}
