//! Security gate models

use serde::{Deserialize, Serialize};

use crate::models::workflow::CredentialRef;

/// Issue severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Points deducted from the 100-point security score
    pub fn deduction(&self) -> u32 {
        match self {
            Severity::Critical => 40,
            Severity::High => 25,
            Severity::Medium => 10,
            Severity::Low => 5,
        }
    }
}

/// A single finding of the security scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityIssue {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    pub details: String,
    pub fix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<usize>,
}

/// Advice attached to a scan, never affects the verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSuggestion {
    UseExistingCredential {
        message: String,
        credentials: Vec<CredentialRef>,
    },
    CreateNewCredential {
        message: String,
        reason: String,
    },
}

/// Verdict of the security gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True exactly when `issues` is empty
    pub safe: bool,
    pub issues: Vec<SecurityIssue>,
    pub suggestions: Vec<CredentialSuggestion>,
    /// 0..=100, see [`security_score`]
    pub score: u32,
    pub timestamp: String,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<SecurityIssue>, suggestions: Vec<CredentialSuggestion>) -> Self {
        Self {
            safe: issues.is_empty(),
            score: security_score(&issues),
            issues,
            suggestions,
            timestamp: crate::utils::now_iso(),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// `max(0, 100 - sum of deductions)`
pub fn security_score(issues: &[SecurityIssue]) -> u32 {
    let deductions: u32 = issues.iter().map(|i| i.severity.deduction()).sum();
    100u32.saturating_sub(deductions)
}

/// Facts about the surrounding workflow the scanner may consult
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanContext {
    /// The user explicitly asked for a destructive operation
    #[serde(default)]
    pub user_explicitly_requested: bool,

    /// Credentials already configured in the editor
    #[serde(default)]
    pub existing_credentials: Vec<CredentialRef>,
}

/// Platform-level security status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityStatus {
    pub safe: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}
