//! Security gate for AI-proposed changes.
//!
//! The scanner holds only its compiled rule tables, so one instance can be
//! shared across concurrent validations.

pub mod patterns;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::CopilotError;
use crate::models::security::{
    CredentialSuggestion, ScanContext, SecurityIssue, Severity, ValidationResult,
};
use crate::models::workflow::CredentialRef;

use self::patterns::{compile, CompiledFamily, AUTH_KEYWORDS, DANGEROUS_SCOPES, FAMILIES};

/// Length of a match quoted in issue details
const QUOTE_LEN: usize = 30;

#[derive(Debug, Clone)]
pub struct SecurityScanner {
    families: Vec<CompiledFamily>,
}

impl SecurityScanner {
    pub fn new() -> Result<Self, CopilotError> {
        Ok(Self {
            families: compile(FAMILIES)?,
        })
    }

    /// Scan an untyped AI response before it is applied.
    ///
    /// `safe` is true exactly when no issue was found. Suggestions never
    /// affect the verdict.
    pub fn validate_ai_response(&self, change: &Value, context: &ScanContext) -> ValidationResult {
        let text = match serde_json::to_string(change) {
            Ok(text) => text,
            Err(e) => {
                warn!("Security scan failed: {}", e);
                return ValidationResult::from_issues(vec![scanner_error(&e.to_string())], Vec::new());
            }
        };

        let mut issues = self.scan_text(&text);
        issues.extend(check_excessive_permissions(change, context));
        let suggestions = suggest_credentials(&text, &context.existing_credentials);

        let result = ValidationResult::from_issues(issues, suggestions);
        debug!(
            "Security scan: safe={} score={} issues={}",
            result.safe,
            result.score,
            result.issues.len()
        );
        result
    }

    /// One issue per matching pattern, in family order
    pub fn scan_text(&self, text: &str) -> Vec<SecurityIssue> {
        let mut issues = Vec::new();
        for compiled in &self.families {
            let family = &compiled.family;
            for regex in &compiled.regexes {
                let matches: Vec<&str> = regex.find_iter(text).map(|m| m.as_str()).collect();
                let Some(first) = matches.first() else {
                    continue;
                };
                let details = match family.details {
                    Some(details) => details.to_string(),
                    None if family.severity == Severity::Critical => {
                        format!("Matched: {}...", first.chars().take(QUOTE_LEN).collect::<String>())
                    }
                    None => format!("{} suspicious value(s) found", matches.len()),
                };
                issues.push(SecurityIssue {
                    severity: family.severity,
                    issue_type: family.issue_type.to_string(),
                    message: family.message.to_string(),
                    details,
                    fix: family.fix.to_string(),
                    matches: Some(matches.len()),
                });
            }
        }
        issues
    }
}

/// Whether the serialized change mentions authentication
pub fn detect_authentication_need(text: &str) -> bool {
    let text = text.to_lowercase();
    AUTH_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Destructive verbs without consent and over-broad OAuth scopes
pub fn check_excessive_permissions(change: &Value, context: &ScanContext) -> Vec<SecurityIssue> {
    let mut issues = Vec::new();
    let Some(settings) = change.get("settings") else {
        return issues;
    };

    let method = settings.get("method").and_then(Value::as_str).unwrap_or_default();
    if method.eq_ignore_ascii_case("DELETE") && !context.user_explicitly_requested {
        issues.push(SecurityIssue {
            severity: Severity::Medium,
            issue_type: "excessive_permission".to_string(),
            message: "The change issues a DELETE request".to_string(),
            details: "Deleting data needs the user's explicit consent".to_string(),
            fix: "Ask the user to confirm the deletion".to_string(),
            matches: None,
        });
    }

    if let Some(scope) = settings.get("scope").and_then(Value::as_str) {
        let dangerous: Vec<&str> = scope
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .filter(|s| {
                let s = s.to_lowercase();
                DANGEROUS_SCOPES.iter().any(|d| s.contains(d))
            })
            .collect();
        if !dangerous.is_empty() {
            issues.push(SecurityIssue {
                severity: Severity::Medium,
                issue_type: "excessive_oauth_scope".to_string(),
                message: "The change requests excessive OAuth scopes".to_string(),
                details: format!("Dangerous scopes: {}", dangerous.join(", ")),
                fix: "Request only the scopes the workflow needs".to_string(),
                matches: None,
            });
        }
    }

    issues
}

/// Suggest reusing a known credential when the change needs authentication
pub fn suggest_credentials(text: &str, known: &[CredentialRef]) -> Vec<CredentialSuggestion> {
    if !detect_authentication_need(text) {
        return Vec::new();
    }

    let lower = text.to_lowercase();
    let mentions = |s: &str| !s.is_empty() && lower.contains(&s.to_lowercase());
    let relevant: Vec<CredentialRef> = known
        .iter()
        .filter(|c| mentions(&c.credential_type) || mentions(&c.name))
        .cloned()
        .collect();

    if relevant.is_empty() {
        vec![CredentialSuggestion::CreateNewCredential {
            message: "Create a new credential for this service".to_string(),
            reason: "Keeps authentication details out of node settings".to_string(),
        }]
    } else {
        vec![CredentialSuggestion::UseExistingCredential {
            message: "An existing credential can be reused".to_string(),
            credentials: relevant,
        }]
    }
}

/// One-line verdict for display
pub fn summarize(result: &ValidationResult) -> String {
    if result.safe {
        return "Security check passed".to_string();
    }

    let mut parts = Vec::new();
    for (severity, label) in [
        (Severity::Critical, "critical"),
        (Severity::High, "high"),
        (Severity::Medium, "medium"),
        (Severity::Low, "low"),
    ] {
        let count = result.count(severity);
        if count > 0 {
            parts.push(format!("{} {}", count, label));
        }
    }
    format!(
        "Security issues found: {} (score {}/100)",
        parts.join(", "),
        result.score
    )
}

fn scanner_error(details: &str) -> SecurityIssue {
    SecurityIssue {
        severity: Severity::Critical,
        issue_type: "scanner_error".to_string(),
        message: "The security scan could not complete".to_string(),
        details: details.to_string(),
        fix: "Review the change manually".to_string(),
        matches: None,
    }
}
