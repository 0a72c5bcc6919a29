//! Path discovery and flow validation over a workflow graph

use std::collections::{HashSet, VecDeque};

use crate::analysis::schema::{expects_string_body, is_trigger_type};
use crate::models::flow::{
    FlowIssue, FlowIssueKind, FlowIssueSeverity, FlowValidation, OutputInfo, PathInfo, ValueKind,
};
use crate::models::workflow::{NodeRef, WorkflowStructure};

/// Node types that add weight to a path's complexity
const COMPLEX_TYPES: &[&str] = &["Function", "Code", "IF", "Loop"];

/// Ids of every node with a directed path to `target`, `target` included
fn nodes_reaching<'a>(structure: &'a WorkflowStructure, target: &'a str) -> HashSet<&'a str> {
    let mut seen: HashSet<&str> = HashSet::from([target]);
    let mut queue: VecDeque<&str> = VecDeque::from([target]);
    while let Some(id) = queue.pop_front() {
        for pred in structure.predecessors(id) {
            if seen.insert(pred) {
                queue.push_back(pred);
            }
        }
    }
    seen
}

struct PathSearch<'a> {
    structure: &'a WorkflowStructure,
    target: &'a str,
    relevant: HashSet<&'a str>,
    on_path: HashSet<&'a str>,
    path: Vec<&'a str>,
    found: Vec<Vec<String>>,
    max_paths: usize,
    budget: usize,
}

impl<'a> PathSearch<'a> {
    fn exhausted(&self) -> bool {
        self.found.len() >= self.max_paths || self.budget == 0
    }

    fn visit(&mut self, node: &'a str) {
        if self.exhausted() {
            return;
        }
        self.budget -= 1;
        self.on_path.insert(node);
        self.path.push(node);

        if node == self.target {
            self.found.push(self.path.iter().map(|id| id.to_string()).collect());
        } else {
            for next in self.structure.successors(node) {
                // a node already on the path closes a cycle and ends the branch
                if !self.on_path.contains(next) && self.relevant.contains(next) {
                    self.visit(next);
                }
            }
        }

        self.path.pop();
        self.on_path.remove(node);
    }
}

/// All simple paths from start nodes (no incoming connections) to `target`.
///
/// Cycle-safe. Stops after `max_paths` paths or `(n + 1) * (e + 1)` visits,
/// whichever comes first.
pub fn find_paths(structure: &WorkflowStructure, target: &str, max_paths: usize) -> Vec<Vec<String>> {
    if structure.node(target).is_none() {
        return Vec::new();
    }

    let relevant = nodes_reaching(structure, target);
    let mut search = PathSearch {
        structure,
        target,
        on_path: HashSet::new(),
        path: Vec::new(),
        found: Vec::new(),
        max_paths,
        budget: (structure.nodes.len() + 1) * (structure.connections.len() + 1),
        relevant,
    };

    for start in structure.start_nodes() {
        if search.relevant.contains(start) {
            search.visit(start);
        }
    }
    search.found
}

/// Path length plus half a point per node of a complex type
pub fn path_complexity(structure: &WorkflowStructure, nodes: &[String]) -> f64 {
    let complex = nodes
        .iter()
        .filter_map(|id| structure.node(id))
        .filter(|n| COMPLEX_TYPES.contains(&n.node_type.as_str()))
        .count();
    nodes.len() as f64 + complex as f64 * 0.5
}

pub fn trace_paths(structure: &WorkflowStructure, target: &str, max_paths: usize) -> Vec<PathInfo> {
    find_paths(structure, target, max_paths)
        .into_iter()
        .map(|nodes| PathInfo {
            length: nodes.len(),
            complexity: path_complexity(structure, &nodes),
            nodes,
        })
        .collect()
}

/// First of the shortest paths
pub fn shortest_path(paths: &[PathInfo]) -> Option<&PathInfo> {
    paths.iter().min_by_key(|p| p.length)
}

/// Check the data reaching `target` for missing, empty or mistyped input
pub fn validate_flow(target: Option<&NodeRef>, outputs: &[OutputInfo]) -> FlowValidation {
    let mut issues = Vec::new();
    let target_type = target.map(|n| n.node_type.as_str()).unwrap_or_default();

    if outputs.is_empty() && !is_trigger_type(target_type) {
        issues.push(FlowIssue {
            severity: FlowIssueSeverity::Warning,
            kind: FlowIssueKind::NoInput,
            node_id: target.map(|n| n.id.clone()),
            message: "No input data reaches this node".to_string(),
            suggestion: "Connect a previous node".to_string(),
        });
    }

    for output in outputs {
        let missing = matches!(output.output, None | Some(serde_json::Value::Null));
        if missing || output.error.is_some() {
            issues.push(FlowIssue {
                severity: FlowIssueSeverity::Error,
                kind: FlowIssueKind::NullInput,
                node_id: Some(output.node_id.clone()),
                message: format!("{} produced no output", output.node_name),
                suggestion: "Check that the previous node ran successfully".to_string(),
            });
        }
    }

    if expects_string_body(target_type) {
        for output in outputs {
            let Some(schema) = &output.schema else {
                continue;
            };
            if schema.kind != ValueKind::String {
                issues.push(FlowIssue {
                    severity: FlowIssueSeverity::Warning,
                    kind: FlowIssueKind::TypeMismatch,
                    node_id: Some(output.node_id.clone()),
                    message: format!("Output of {} may not fit a {} body", output.node_name, target_type),
                    suggestion: "Convert the data with a Function node".to_string(),
                });
            }
        }
    }

    FlowValidation {
        valid: issues.is_empty(),
        issues,
    }
}
