//! Workflow models

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of the edited workflow graph.
///
/// The graph is directed and may contain cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStructure {
    /// Number of nodes observed
    #[serde(default)]
    pub node_count: usize,

    /// Nodes in the workflow, unique by id
    #[serde(default)]
    pub nodes: Vec<NodeRef>,

    /// Directed connections between nodes
    #[serde(default)]
    pub connections: Vec<Edge>,
}

impl WorkflowStructure {
    /// Build a structure, deriving `node_count` from `nodes`
    pub fn new(nodes: Vec<NodeRef>, connections: Vec<Edge>) -> Self {
        Self {
            node_count: nodes.len(),
            nodes,
            connections,
        }
    }

    /// Look up a node by id
    pub fn node(&self, node_id: &str) -> Option<&NodeRef> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Distinct ids of nodes directly reachable from `node_id`, in connection order
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for conn in self.connections.iter().filter(|c| c.source == node_id) {
            if !ids.contains(&conn.target.as_str()) {
                ids.push(conn.target.as_str());
            }
        }
        ids
    }

    /// Distinct ids of nodes with a connection into `node_id`, in connection order
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for conn in self.connections.iter().filter(|c| c.target == node_id) {
            if !ids.contains(&conn.source.as_str()) {
                ids.push(conn.source.as_str());
            }
        }
        ids
    }

    /// Ids of nodes without incoming connections
    pub fn start_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.connections.iter().any(|c| c.target == n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Node types present, in node order
    pub fn node_types(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.node_type.as_str()).collect()
    }
}

/// A node as seen from the editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    /// Node id, unique within a structure snapshot
    pub id: String,

    /// Node type (e.g. "Webhook", "HTTP Request", "Code")
    #[serde(rename = "type", default)]
    pub node_type: String,

    /// Display name
    #[serde(default)]
    pub name: String,
}

impl NodeRef {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            name: name.into(),
        }
    }
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Connection id, when the editor exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A settings field of the currently opened node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    /// Field label or name
    pub name: String,

    /// Current value
    #[serde(default)]
    pub value: serde_json::Value,

    /// Input kind reported by the editor (text, select, code...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

/// A credential already configured in the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// One past workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

/// Last known output of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeOutput {
    /// Output value, `None` when the node never produced one
    #[serde(default)]
    pub data: Option<serde_json::Value>,

    /// Error reported by the node's last run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
