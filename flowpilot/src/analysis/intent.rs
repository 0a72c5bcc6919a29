//! Business intent, complexity and structural pattern detection

use std::collections::BTreeSet;

use crate::models::intent::{BusinessIntent, Complexity, IntentPattern, StructuralPattern};
use crate::models::workflow::WorkflowStructure;

/// A node type a pattern looks for
#[derive(Debug, Clone, Copy)]
enum Marker {
    Exact(&'static str),
    Contains(&'static str),
}

impl Marker {
    fn present(&self, types: &BTreeSet<&str>) -> bool {
        match self {
            Marker::Exact(t) => types.contains(t),
            Marker::Contains(fragment) => types.iter().any(|t| t.contains(fragment)),
        }
    }
}

struct IntentRule {
    pattern: IntentPattern,
    goal: &'static str,
    markers: &'static [Marker],
    detect: fn(&BTreeSet<&str>) -> bool,
}

/// Recognizable shapes, checked in order
const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        pattern: IntentPattern::WebhookToNotification,
        goal: "Event notification automation",
        markers: &[Marker::Exact("Webhook"), Marker::Exact("Slack"), Marker::Exact("Email")],
        detect: |t| t.contains("Webhook") && (t.contains("Slack") || t.contains("Email")),
    },
    IntentRule {
        pattern: IntentPattern::ScheduledDataSync,
        goal: "Periodic data synchronization",
        markers: &[Marker::Exact("Schedule"), Marker::Exact("HTTP Request")],
        detect: |t| t.contains("Schedule") && t.contains("HTTP Request"),
    },
    IntentRule {
        pattern: IntentPattern::FormToDatabase,
        goal: "Form response collection",
        markers: &[
            Marker::Exact("Google Forms"),
            Marker::Exact("Typeform"),
            Marker::Exact("Airtable"),
        ],
        detect: |t| (t.contains("Google Forms") || t.contains("Typeform")) && t.contains("Airtable"),
    },
    IntentRule {
        pattern: IntentPattern::ApiEtl,
        goal: "API data ETL",
        markers: &[
            Marker::Exact("HTTP Request"),
            Marker::Exact("Function"),
            Marker::Contains("Database"),
        ],
        detect: |t| {
            t.contains("HTTP Request") && t.contains("Function") && t.iter().any(|n| n.contains("Database"))
        },
    },
];

/// Size class by node and connection counts
pub fn analyze_complexity(structure: &WorkflowStructure) -> Complexity {
    let nodes = structure.nodes.len();
    let connections = structure.connections.len();

    if nodes > 15 || connections > 20 {
        Complexity::Complex
    } else if nodes > 7 || connections > 10 {
        Complexity::Medium
    } else {
        Complexity::Simple
    }
}

/// Infer what the workflow is for from the set of node types it contains
pub fn infer_business_intent(structure: &WorkflowStructure) -> BusinessIntent {
    let types: BTreeSet<&str> = structure.nodes.iter().map(|n| n.node_type.as_str()).collect();
    let complexity = analyze_complexity(structure);
    let node_count = structure.nodes.len();

    match INTENT_RULES.iter().find(|rule| (rule.detect)(&types)) {
        Some(rule) => {
            let present = rule.markers.iter().filter(|m| m.present(&types)).count();
            BusinessIntent {
                goal: rule.goal.to_string(),
                pattern: rule.pattern,
                complexity,
                node_count,
                confidence: (present as f64 / rule.markers.len() as f64).min(1.0),
            }
        }
        None => BusinessIntent {
            complexity,
            node_count,
            ..Default::default()
        },
    }
}

/// Recurring structural features
pub fn detect_structural_patterns(structure: &WorkflowStructure) -> Vec<StructuralPattern> {
    let types = structure.node_types();
    let mut patterns = Vec::new();

    if types.contains(&"IF") {
        patterns.push(StructuralPattern::ConditionalLogic);
    }
    if types.contains(&"Loop") || types.contains(&"Split In Batches") {
        patterns.push(StructuralPattern::Iteration);
    }
    if types.contains(&"Merge") {
        patterns.push(StructuralPattern::DataMerge);
    }
    if types.iter().filter(|t| **t == "HTTP Request").count() > 3 {
        patterns.push(StructuralPattern::MultiApiIntegration);
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workflow::{Edge, NodeRef};

    fn structure(types: &[&str], edges: usize) -> WorkflowStructure {
        let nodes: Vec<NodeRef> = types
            .iter()
            .enumerate()
            .map(|(i, t)| NodeRef::new(format!("n{}", i), *t, *t))
            .collect();
        let connections = (0..edges).map(|i| Edge::new(format!("n{}", i), format!("n{}", i + 1))).collect();
        WorkflowStructure::new(nodes, connections)
    }

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(analyze_complexity(&structure(&["Set"; 7], 10)), Complexity::Simple);
        assert_eq!(analyze_complexity(&structure(&["Set"; 8], 0)), Complexity::Medium);
        assert_eq!(analyze_complexity(&structure(&["Set"; 3], 11)), Complexity::Medium);
        assert_eq!(analyze_complexity(&structure(&["Set"; 15], 20)), Complexity::Medium);
        assert_eq!(analyze_complexity(&structure(&["Set"; 16], 0)), Complexity::Complex);
        assert_eq!(analyze_complexity(&structure(&["Set"; 2], 21)), Complexity::Complex);
    }

    #[test]
    fn test_intent_is_order_insensitive() {
        let a = infer_business_intent(&structure(&["Webhook", "Set", "Slack"], 2));
        let b = infer_business_intent(&structure(&["Slack", "Webhook", "Set"], 2));
        assert_eq!(a.pattern, IntentPattern::WebhookToNotification);
        assert_eq!(a.pattern, b.pattern);
        assert_eq!(a.confidence, b.confidence);
        assert!((a.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_intent_api_etl_with_database_fragment() {
        let intent = infer_business_intent(&structure(&["HTTP Request", "Function", "Postgres Database"], 2));
        assert_eq!(intent.pattern, IntentPattern::ApiEtl);
        assert_eq!(intent.confidence, 1.0);
    }

    #[test]
    fn test_intent_unknown() {
        let intent = infer_business_intent(&structure(&["Set", "Code"], 1));
        assert_eq!(intent.pattern, IntentPattern::Unknown);
        assert_eq!(intent.goal, "unknown");
        assert_eq!(intent.confidence, 0.0);
        assert_eq!(intent.complexity, Complexity::Simple);
        assert_eq!(intent.node_count, 2);
    }

    #[test]
    fn test_structural_patterns() {
        let wf = structure(
            &["IF", "Merge", "HTTP Request", "HTTP Request", "HTTP Request", "HTTP Request"],
            0,
        );
        assert_eq!(
            detect_structural_patterns(&wf),
            vec![
                StructuralPattern::ConditionalLogic,
                StructuralPattern::DataMerge,
                StructuralPattern::MultiApiIntegration
            ]
        );
    }
}
