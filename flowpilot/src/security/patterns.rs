//! Secret and PII rule families

use regex::Regex;

use crate::errors::CopilotError;
use crate::models::security::Severity;

/// One family of related patterns, reported with the same issue type
#[derive(Debug, Clone, Copy)]
pub struct RuleFamily {
    pub issue_type: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    /// Fixed details text, or `None` to quote the first match
    pub details: Option<&'static str>,
    pub fix: &'static str,
    pub patterns: &'static [&'static str],
}

pub const API_KEYS: RuleFamily = RuleFamily {
    issue_type: "hardcoded_api_key",
    severity: Severity::Critical,
    message: "The change contains a hardcoded API key",
    details: None,
    fix: "Store the key in a credential instead",
    patterns: &[
        r#"(?i)["']?api[_-]?key["']?\s*[:=]\s*["']\w{20,}["']?"#,
        r#"(?i)["']?token["']?\s*[:=]\s*["']\w{20,}["']?"#,
        r#"(?i)["']?secret["']?\s*[:=]\s*["']\w{20,}["']?"#,
        r"(?i)Bearer\s+\w{20,}",
        r"(?i)sk-[a-zA-Z0-9]{20,}",
        r"(?i)ghp_[a-zA-Z0-9]{36}",
        r"(?i)xoxb-[a-zA-Z0-9\-]+",
    ],
};

pub const PASSWORDS: RuleFamily = RuleFamily {
    issue_type: "hardcoded_password",
    severity: Severity::Critical,
    message: "The change contains a hardcoded password",
    details: Some("Passwords belong in environment variables or credentials"),
    fix: "Use a credential or an environment variable",
    patterns: &[
        r#"(?i)["']?password["']?\s*[:=]\s*["']\S+["']?"#,
        r#"(?i)["']?passwd["']?\s*[:=]\s*["']\S+["']?"#,
        r#"(?i)["']?pwd["']?\s*[:=]\s*["']\S+["']?"#,
    ],
};

pub const OAUTH: RuleFamily = RuleFamily {
    issue_type: "hardcoded_oauth_secret",
    severity: Severity::Critical,
    message: "The change contains a hardcoded OAuth client secret",
    details: Some("OAuth secrets must never be embedded in workflow settings"),
    fix: "Use an OAuth2 credential",
    patterns: &[
        r#"(?i)client[_-]?secret["']?\s*[:=]\s*["']\w{20,}["']?"#,
        r#"(?i)consumer[_-]?secret["']?\s*[:=]\s*["']\w{20,}["']?"#,
    ],
};

pub const AWS: RuleFamily = RuleFamily {
    issue_type: "hardcoded_aws_key",
    severity: Severity::Critical,
    message: "The change exposes an AWS access key",
    details: Some("A leaked AWS key grants access to the whole account"),
    fix: "Use an AWS credential",
    patterns: &[r"(?i)AKIA[0-9A-Z]{16}", r"(?i)aws[_-]?secret[_-]?access[_-]?key"],
};

pub const PII: RuleFamily = RuleFamily {
    issue_type: "sensitive_data_exposure",
    severity: Severity::High,
    message: "The change may contain personal data",
    details: None,
    fix: "Mask or encrypt the data",
    patterns: &[
        // national id
        r"\d{6}-\d{7}",
        // ssn
        r"\d{3}-\d{2}-\d{4}",
        // card number
        r"\d{4}-\d{4}-\d{4}-\d{4}",
    ],
};

pub const DATABASE: RuleFamily = RuleFamily {
    issue_type: "database_connection_string",
    severity: Severity::Critical,
    message: "The change exposes a database connection string",
    details: Some("Connection details belong in environment variables or credentials"),
    fix: "Use a credential or an environment variable",
    patterns: &[
        r"(?i)mongodb(\+srv)?://\S+",
        r"(?i)postgres://\S+",
        r"(?i)mysql://\S+",
        r"(?i)redis://\S+",
    ],
};

/// Families in reporting order
pub const FAMILIES: &[RuleFamily] = &[API_KEYS, PASSWORDS, OAUTH, AWS, PII, DATABASE];

/// OAuth scope fragments treated as excessive
pub const DANGEROUS_SCOPES: &[&str] = &["delete", "admin", "write_all", "full_access"];

/// Keywords implying the change talks to an authenticated service
pub const AUTH_KEYWORDS: &[&str] = &[
    "authorization",
    "api-key",
    "api_key",
    "token",
    "bearer",
    "oauth",
    "credential",
];

/// A rule family with its patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledFamily {
    pub family: RuleFamily,
    pub regexes: Vec<Regex>,
}

pub fn compile(families: &[RuleFamily]) -> Result<Vec<CompiledFamily>, CopilotError> {
    families
        .iter()
        .map(|family| -> Result<CompiledFamily, CopilotError> {
            let regexes = family
                .patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompiledFamily {
                family: *family,
                regexes,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_families_compile() {
        let compiled = compile(FAMILIES).unwrap();
        assert_eq!(compiled.len(), FAMILIES.len());
        let total: usize = compiled.iter().map(|c| c.regexes.len()).sum();
        assert_eq!(total, 21);
    }
}
