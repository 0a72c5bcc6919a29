//! Remediation pattern catalog.
//!
//! The catalog is data: it is loaded once (from the bundled table or a JSON
//! file) and shared read-only with whatever needs it.

use std::path::Path;

use indexmap::IndexMap;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::CopilotError;
use crate::models::pattern::{AutoFix, Pattern, PatternCategory};

const BUILTIN: &str = include_str!("builtin.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    patterns: Vec<Pattern>,
}

/// How strongly a pattern matches the observed problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
}

impl MatchConfidence {
    fn from_score(score: u32) -> Self {
        if score > 15 {
            MatchConfidence::High
        } else if score > 8 {
            MatchConfidence::Medium
        } else {
            MatchConfidence::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    pub pattern_id: String,
    pub score: u32,
    pub confidence: MatchConfidence,
}

/// What is known about the problem being diagnosed
#[derive(Debug, Clone, Default)]
pub struct DetectionInput<'a> {
    pub error_message: Option<&'a str>,
    pub code: Option<&'a str>,
    pub node_type: Option<&'a str>,
    /// Fewer items came out of the node than went in
    pub data_loss: bool,
}

#[derive(Debug, Clone)]
pub struct PatternCatalog {
    version: String,
    patterns: IndexMap<String, Pattern>,
}

impl PatternCatalog {
    pub fn from_json(json: &str) -> Result<Self, CopilotError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut patterns = IndexMap::with_capacity(file.patterns.len());
        for pattern in file.patterns {
            if let Some(fix) = &pattern.auto_fix {
                Regex::new(&fix.search_pattern)?;
            }
            let id = pattern.id.clone();
            if patterns.insert(id.clone(), pattern).is_some() {
                return Err(CopilotError::CatalogError(format!("duplicate pattern id '{}'", id)));
            }
        }
        debug!("Loaded pattern catalog v{} with {} pattern(s)", file.version, patterns.len());
        Ok(Self {
            version: file.version,
            patterns,
        })
    }

    /// Catalog bundled with the binary
    pub fn builtin() -> Result<Self, CopilotError> {
        Self::from_json(BUILTIN)
    }

    pub async fn load(path: &Path) -> Result<Self, CopilotError> {
        info!("Loading pattern catalog from {}", path.display());
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, id: &str) -> Option<&Pattern> {
        self.patterns.get(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.patterns.keys().map(String::as_str).collect()
    }

    pub fn by_category(&self, category: PatternCategory) -> Vec<&Pattern> {
        self.patterns.values().filter(|p| p.category == category).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns relevant to a problem, best score first.
    ///
    /// Each keyword found in the error message scores 10 (case-insensitive),
    /// each keyword found in the code scores 5, an auto-fix targeting the node
    /// type scores 3 and observed data loss scores 15 for patterns that cause
    /// it. Ties keep catalog order.
    pub fn detect_relevant(&self, input: &DetectionInput<'_>) -> Vec<PatternMatch> {
        let message = input.error_message.map(str::to_lowercase);

        let mut matches: Vec<PatternMatch> = self
            .patterns
            .values()
            .filter_map(|pattern| {
                let mut score = 0u32;
                for keyword in &pattern.detection_keywords {
                    if let Some(message) = &message {
                        if message.contains(&keyword.to_lowercase()) {
                            score += 10;
                        }
                    }
                    if input.code.is_some_and(|code| code.contains(keyword.as_str())) {
                        score += 5;
                    }
                }
                let targets_node = pattern
                    .auto_fix
                    .as_ref()
                    .and_then(|f| f.target_node_type.as_deref());
                if input.node_type.is_some() && targets_node == input.node_type {
                    score += 3;
                }
                if input.data_loss && pattern.signals_data_loss {
                    score += 15;
                }

                (score > 0).then(|| PatternMatch {
                    pattern_id: pattern.id.clone(),
                    score,
                    confidence: MatchConfidence::from_score(score),
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }
}

impl AutoFix {
    /// Apply the rule to `code`, returning `None` when nothing matched.
    ///
    /// The replacement is inserted literally, so `$` in it is not a group
    /// reference.
    pub fn apply(&self, code: &str) -> Result<Option<String>, CopilotError> {
        let regex = Regex::new(&self.search_pattern)?;
        if !regex.is_match(code) {
            return Ok(None);
        }
        Ok(Some(regex.replace_all(code, NoExpand(&self.replace_with)).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = PatternCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.ids()[0], "items_array_pattern");
        assert!(catalog.get("oauth2_setup").is_some());
        assert!(catalog.get("missing").is_none());
        assert_eq!(catalog.by_category(PatternCategory::Code).len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"version":"1","patterns":[
            {"id":"a","title":"A","severity":"low","category":"code"},
            {"id":"a","title":"B","severity":"low","category":"code"}]}"#;
        assert!(matches!(
            PatternCatalog::from_json(json),
            Err(CopilotError::CatalogError(_))
        ));
    }

    #[test]
    fn test_auto_fix_replaces_literally() {
        let catalog = PatternCatalog::builtin().unwrap();
        let fix = catalog.get("items_array_pattern").unwrap().auto_fix.clone().unwrap();
        let fixed = fix.apply("const x = 1;\nreturn  items[0];").unwrap();
        assert_eq!(fixed.as_deref(), Some("const x = 1;\nreturn $input.all();"));
        assert_eq!(fix.apply("return $input.all();").unwrap(), None);
    }
}
