//! Pattern catalog integration tests

use std::env;

use flowpilot::catalog::{DetectionInput, MatchConfidence, PatternCatalog};
use flowpilot::errors::CopilotError;
use flowpilot::utils::generate_uuid;

#[test]
fn test_error_message_ranks_oauth_pattern() {
    let catalog = PatternCatalog::builtin().unwrap();
    let input = DetectionInput {
        error_message: Some("Authentication failed: 401 Unauthorized, check the OAuth app"),
        ..Default::default()
    };

    let matches = catalog.detect_relevant(&input);
    assert_eq!(matches[0].pattern_id, "oauth2_setup");
    assert_eq!(matches[0].score, 30);
    assert_eq!(matches[0].confidence, MatchConfidence::High);
}

#[test]
fn test_code_node_and_data_loss_add_up() {
    let catalog = PatternCatalog::builtin().unwrap();
    let input = DetectionInput {
        code: Some("return items[0];"),
        node_type: Some("Code"),
        data_loss: true,
        ..Default::default()
    };

    let matches = catalog.detect_relevant(&input);
    let ids: Vec<&str> = matches.iter().map(|m| m.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["items_array_pattern", "filter_data_loss"]);
    assert_eq!(matches[0].score, 23);
    assert_eq!(matches[1].score, 15);
    assert_eq!(matches[1].confidence, MatchConfidence::Medium);
}

#[test]
fn test_ties_keep_catalog_order() {
    let catalog = PatternCatalog::builtin().unwrap();
    let input = DetectionInput {
        error_message: Some("value is undefined"),
        ..Default::default()
    };

    let matches = catalog.detect_relevant(&input);
    let ids: Vec<&str> = matches.iter().map(|m| m.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["expression_undefined", "set_missing_field"]);
    assert!(matches.iter().all(|m| m.confidence == MatchConfidence::Medium));
}

#[test]
fn test_node_type_alone_is_low_confidence() {
    let catalog = PatternCatalog::builtin().unwrap();
    let input = DetectionInput {
        node_type: Some("Code"),
        ..Default::default()
    };

    let matches = catalog.detect_relevant(&input);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].confidence, MatchConfidence::Low);
    assert!(catalog.detect_relevant(&DetectionInput::default()).is_empty());
}

#[tokio::test]
async fn test_load_catalog_from_file() {
    let path = env::temp_dir().join(format!("flowpilot-catalog-{}.json", generate_uuid()));
    let json = r#"{"version":"2.1.0","patterns":[
        {"id":"retry_on_timeout","title":"Retry on timeout","severity":"medium",
         "category":"setting","detectionKeywords":["timeout"]}]}"#;
    tokio::fs::write(&path, json).await.unwrap();

    let catalog = tokio_test::assert_ok!(PatternCatalog::load(&path).await);
    assert_eq!(catalog.version(), "2.1.0");
    assert_eq!(catalog.ids(), vec!["retry_on_timeout"]);

    tokio::fs::remove_file(&path).await.unwrap();
}

#[test]
fn test_invalid_auto_fix_is_rejected() {
    let json = r#"{"version":"1","patterns":[
        {"id":"broken","title":"Broken","severity":"low","category":"code",
         "autoFix":{"searchPattern":"(unclosed","replaceWith":""}}]}"#;
    assert!(matches!(
        PatternCatalog::from_json(json),
        Err(CopilotError::PatternError(_)) | Err(CopilotError::CatalogError(_))
    ));
}
