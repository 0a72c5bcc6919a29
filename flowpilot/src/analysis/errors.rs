//! Error classification, error chains and root-cause analysis

use std::collections::BTreeMap;

use crate::models::diagnostics::{
    ErrorCause, ErrorChainEntry, ErrorRecord, ErrorReport, ErrorType, RawError, RootCause,
};
use crate::utils::now_iso;

/// Ordered type rules, first match wins
const TYPE_RULES: &[(&[&str], ErrorType)] = &[
    (&["credential"], ErrorType::Credential),
    (&["401", "unauthorized"], ErrorType::Authentication),
    (&["403", "forbidden"], ErrorType::Permission),
    (&["404"], ErrorType::NotFound),
    (&["connection", "timeout"], ErrorType::Connection),
    (&["required"], ErrorType::Validation),
    (&["json", "parse"], ErrorType::DataFormat),
];

/// Ordered cause rules, first match wins
const CAUSE_RULES: &[(&[&str], ErrorCause)] = &[
    (&["401", "unauthorized"], ErrorCause::AuthenticationFailure),
    (&["403", "forbidden"], ErrorCause::PermissionDenied),
    (&["404"], ErrorCause::ResourceNotFound),
    (&["timeout"], ErrorCause::NetworkTimeout),
    (&["json", "parse"], ErrorCause::DataFormatError),
    (&["required"], ErrorCause::MissingRequiredField),
    (&["credential"], ErrorCause::InvalidCredential),
];

fn first_match<T: Copy>(message: &str, rules: &[(&[&str], T)]) -> Option<T> {
    let message = message.to_lowercase();
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map(|(_, value)| *value)
}

/// Classify an error message into its closed error type
pub fn classify_error_type(message: &str) -> ErrorType {
    first_match(message, TYPE_RULES).unwrap_or(ErrorType::General)
}

/// Infer the root-cause tag of an error message
pub fn infer_cause(message: &str) -> ErrorCause {
    if message.trim().is_empty() {
        return ErrorCause::Unknown;
    }
    first_match(message, CAUSE_RULES).unwrap_or(ErrorCause::Unknown)
}

/// Human-readable fix for a cause
pub fn solution_for(cause: ErrorCause) -> &'static str {
    match cause {
        ErrorCause::AuthenticationFailure => "Check the credential or authenticate again",
        ErrorCause::PermissionDenied => "Check the API permission settings",
        ErrorCause::ResourceNotFound => "Check the URL or resource id",
        ErrorCause::NetworkTimeout => "Increase the timeout or check the network",
        ErrorCause::DataFormatError => "Check the JSON structure",
        ErrorCause::MissingRequiredField => "Fill in the required input fields",
        ErrorCause::InvalidCredential => "Check the credential or create it again",
        ErrorCause::Unknown => "Read the error message and consult the node documentation",
    }
}

/// Classify raw editor errors
pub fn classify_errors(raw: &[RawError]) -> Vec<ErrorRecord> {
    let timestamp = now_iso();
    raw.iter()
        .map(|e| ErrorRecord {
            message: e.message.clone(),
            error_type: classify_error_type(&e.message),
            timestamp: timestamp.clone(),
            node_id: e.node_id.clone(),
        })
        .collect()
}

/// Annotate each error with its inferred cause
pub fn trace_error_chain(errors: &[ErrorRecord]) -> Vec<ErrorChainEntry> {
    errors
        .iter()
        .map(|record| ErrorChainEntry {
            cause: infer_cause(&record.message),
            record: record.clone(),
        })
        .collect()
}

/// Pick the most frequent cause of the chain.
///
/// Ties go to the cause encountered first.
pub fn analyze_root_cause(chain: &[ErrorChainEntry]) -> Option<RootCause> {
    let mut tally: Vec<(ErrorCause, usize)> = Vec::new();
    for entry in chain {
        match tally.iter_mut().find(|(cause, _)| *cause == entry.cause) {
            Some((_, count)) => *count += 1,
            None => tally.push((entry.cause, 1)),
        }
    }

    let mut best: Option<(ErrorCause, usize)> = None;
    for (cause, count) in tally {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((cause, count));
        }
    }

    best.map(|(cause, frequency)| RootCause {
        cause,
        frequency,
        affected_nodes: chain
            .iter()
            .filter(|e| e.cause == cause)
            .filter_map(|e| e.record.node_id.clone())
            .collect(),
        solution: solution_for(cause).to_string(),
    })
}

/// Full error report from raw editor errors
pub fn build_error_report(raw: &[RawError]) -> ErrorReport {
    let current = classify_errors(raw);
    let chain = trace_error_chain(&current);
    let root_cause = analyze_root_cause(&chain);
    ErrorReport {
        current,
        chain,
        root_cause,
    }
}

/// Number of errors per type
pub fn error_frequency(errors: &[ErrorRecord]) -> BTreeMap<ErrorType, usize> {
    let mut frequency = BTreeMap::new();
    for error in errors {
        *frequency.entry(error.error_type).or_insert(0) += 1;
    }
    frequency
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_type_order() {
        assert_eq!(classify_error_type("Credential 'Slack' not found (404)"), ErrorType::Credential);
        assert_eq!(classify_error_type("401 Unauthorized"), ErrorType::Authentication);
        assert_eq!(classify_error_type("Request FORBIDDEN"), ErrorType::Permission);
        assert_eq!(classify_error_type("ETIMEDOUT: timeout after 30s"), ErrorType::Connection);
        assert_eq!(classify_error_type("Parameter 'url' is required"), ErrorType::Validation);
        assert_eq!(classify_error_type("Unexpected token in JSON"), ErrorType::DataFormat);
        assert_eq!(classify_error_type("Something odd"), ErrorType::General);
    }

    #[test]
    fn test_infer_cause_first_match_wins() {
        // Matches both 401 and timeout; the earlier rule wins
        assert_eq!(infer_cause("401 after timeout"), ErrorCause::AuthenticationFailure);
        assert_eq!(infer_cause(""), ErrorCause::Unknown);
        assert_eq!(infer_cause("could not parse body"), ErrorCause::DataFormatError);
    }

    #[test]
    fn test_root_cause_most_frequent() {
        let raw = vec![
            RawError::new("401 Unauthorized").on_node("a"),
            RawError::new("Request timeout").on_node("b"),
            RawError::new("unauthorized token").on_node("c"),
            RawError::new("HTTP 401"),
        ];
        let report = build_error_report(&raw);
        let root = report.root_cause.unwrap();
        assert_eq!(root.cause, ErrorCause::AuthenticationFailure);
        assert_eq!(root.frequency, 3);
        assert_eq!(root.affected_nodes, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_root_cause_tie_goes_to_first() {
        let raw = vec![RawError::new("timeout"), RawError::new("404 not here")];
        let root = build_error_report(&raw).root_cause.unwrap();
        assert_eq!(root.cause, ErrorCause::NetworkTimeout);
        assert_eq!(root.frequency, 1);
    }

    #[test]
    fn test_empty_chain_has_no_root_cause() {
        assert!(analyze_root_cause(&[]).is_none());
        assert!(build_error_report(&[]).root_cause.is_none());
    }
}
