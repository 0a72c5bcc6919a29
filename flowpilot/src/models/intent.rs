//! Business intent models

use serde::{Deserialize, Serialize};

/// Size class of a workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Medium,
    Complex,
}

/// Recognizable workflow shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentPattern {
    WebhookToNotification,
    ScheduledDataSync,
    FormToDatabase,
    ApiEtl,
    Unknown,
}

/// Heuristically inferred goal of the workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIntent {
    pub goal: String,
    pub pattern: IntentPattern,
    pub complexity: Complexity,
    pub node_count: usize,
    /// In `[0, 1]`
    pub confidence: f64,
}

impl Default for BusinessIntent {
    fn default() -> Self {
        Self {
            goal: "unknown".to_string(),
            pattern: IntentPattern::Unknown,
            complexity: Complexity::Simple,
            node_count: 0,
            confidence: 0.0,
        }
    }
}

/// Recurring structural features of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralPattern {
    ConditionalLogic,
    Iteration,
    DataMerge,
    MultiApiIntegration,
}
