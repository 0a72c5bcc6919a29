//! Remediation pattern models

use serde::{Deserialize, Serialize};

use crate::models::security::Severity;

/// Area of the workflow a pattern fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Code,
    Expression,
    Setting,
    Credential,
    DataFlow,
    WorkflowStructure,
}

/// A known problem together with its fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detection_keywords: Vec<String>,
    pub severity: Severity,
    pub category: PatternCategory,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_fix: Option<AutoFix>,
    /// The problem silently drops items
    #[serde(default)]
    pub signals_data_loss: bool,
    #[serde(default)]
    pub manual_steps: Vec<GuideStep>,
}

/// Search-and-replace rule applied to node code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoFix {
    /// Regular expression to search for
    pub search_pattern: String,
    /// Literal replacement text
    pub replace_with: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_node_type: Option<String>,
}

/// Kind of editor element a guide step acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepTarget {
    Node,
    Code,
    Input,
    Expression,
    Button,
    Tab,
    Select,
    Form,
    UserConfirmation,
    Other(String),
}

impl From<String> for StepTarget {
    fn from(value: String) -> Self {
        match value.as_str() {
            "node" => StepTarget::Node,
            "code" => StepTarget::Code,
            "input" => StepTarget::Input,
            "expression" => StepTarget::Expression,
            "button" => StepTarget::Button,
            "tab" => StepTarget::Tab,
            "select" => StepTarget::Select,
            "form" => StepTarget::Form,
            "user_confirmation" => StepTarget::UserConfirmation,
            _ => StepTarget::Other(value),
        }
    }
}

impl From<StepTarget> for String {
    fn from(value: StepTarget) -> Self {
        match value {
            StepTarget::Node => "node".to_string(),
            StepTarget::Code => "code".to_string(),
            StepTarget::Input => "input".to_string(),
            StepTarget::Expression => "expression".to_string(),
            StepTarget::Button => "button".to_string(),
            StepTarget::Tab => "tab".to_string(),
            StepTarget::Select => "select".to_string(),
            StepTarget::Form => "form".to_string(),
            StepTarget::UserConfirmation => "user_confirmation".to_string(),
            StepTarget::Other(other) => other,
        }
    }
}

/// One manual remediation step.
///
/// Which optional fields matter depends on `target`: `code` uses
/// `search_text` or `before`/`after`, `input`/`expression`/`select` use
/// `field_name` and `value`, `tab` uses `target_text`, `button` uses
/// `button_text`, `form` uses `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideStep {
    pub description: String,
    pub target: StepTarget,
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
}

impl GuideStep {
    pub fn new(description: impl Into<String>, target: StepTarget) -> Self {
        Self {
            description: description.into(),
            target,
            action: String::new(),
            search_text: None,
            before: None,
            after: None,
            field_name: None,
            value: None,
            fields: Vec::new(),
            target_text: None,
            button_text: None,
        }
    }
}

/// Progress through a guided session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub index: usize,
    pub total: usize,
    pub step: GuideStep,
    pub percentage: u32,
}
