//! AI-proposed changes and their application results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::security::SecurityIssue;

/// Typed view over the untyped AI response.
///
/// The raw `Value` is what the security gate scans; this view is only used
/// for dispatching once the change passed the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRequest {
    FillSettings(Map<String, Value>),
    CreateNode {
        node_type: String,
        settings: Map<String, Value>,
    },
    FixError(Value),
    Unknown(String),
}

impl ChangeRequest {
    pub fn from_value(change: &Value) -> Self {
        let action = change.get("action").and_then(Value::as_str).unwrap_or_default();
        let settings = change
            .get("settings")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match action {
            "fill_settings" => ChangeRequest::FillSettings(settings),
            "create_node" => ChangeRequest::CreateNode {
                node_type: change
                    .get("nodeType")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                settings,
            },
            "fix_error" => ChangeRequest::FixError(change.get("fix").cloned().unwrap_or(Value::Null)),
            other => ChangeRequest::Unknown(other.to_string()),
        }
    }
}

/// Outcome of asking an adapter to apply a change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<SecurityIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl ApplyResult {
    pub fn filled(count: usize) -> Self {
        Self {
            success: true,
            message: format!("Filled {} field(s)", count),
            filled_count: Some(count),
            ..Default::default()
        }
    }

    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn security_violation(issues: Vec<SecurityIssue>, score: u32) -> Self {
        Self {
            success: false,
            error: Some("security_violation".to_string()),
            message: "Security issues detected in the proposed change".to_string(),
            issues,
            score: Some(score),
            ..Default::default()
        }
    }
}
