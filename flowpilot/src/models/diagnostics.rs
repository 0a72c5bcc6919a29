//! Error observation models

use serde::{Deserialize, Serialize};

/// Closed classification of an observed editor error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Credential,
    Authentication,
    Permission,
    NotFound,
    Connection,
    Validation,
    DataFormat,
    General,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Credential => "credential",
            ErrorType::Authentication => "authentication",
            ErrorType::Permission => "permission",
            ErrorType::NotFound => "not_found",
            ErrorType::Connection => "connection",
            ErrorType::Validation => "validation",
            ErrorType::DataFormat => "data_format",
            ErrorType::General => "general",
        }
    }
}

/// Inferred root-cause tag of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCause {
    AuthenticationFailure,
    PermissionDenied,
    ResourceNotFound,
    NetworkTimeout,
    DataFormatError,
    MissingRequiredField,
    InvalidCredential,
    Unknown,
}

impl ErrorCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCause::AuthenticationFailure => "authentication_failure",
            ErrorCause::PermissionDenied => "permission_denied",
            ErrorCause::ResourceNotFound => "resource_not_found",
            ErrorCause::NetworkTimeout => "network_timeout",
            ErrorCause::DataFormatError => "data_format_error",
            ErrorCause::MissingRequiredField => "missing_required_field",
            ErrorCause::InvalidCredential => "invalid_credential",
            ErrorCause::Unknown => "unknown",
        }
    }
}

/// An error message as read from the editor, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl RawError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node_id: None,
        }
    }

    pub fn on_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }
}

/// A classified error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// An error record annotated with its inferred cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorChainEntry {
    #[serde(flatten)]
    pub record: ErrorRecord,
    pub cause: ErrorCause,
}

/// The most frequent cause across an error chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCause {
    pub cause: ErrorCause,
    pub frequency: usize,
    pub affected_nodes: Vec<String>,
    pub solution: String,
}

/// Result of error discovery: current errors, their chain and the root cause
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub current: Vec<ErrorRecord>,
    pub chain: Vec<ErrorChainEntry>,
    pub root_cause: Option<RootCause>,
}
