//! Owned, serializable copy of the graph at one point in time.

use serde::Serialize;

use super::registry::EntityMetadata;
use super::store::RelationshipMetadata;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    /// Display label; identical to `id`.
    pub label: String,
    pub metadata: EntityMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    pub label: String,
    pub metadata: RelationshipMetadata,
}

/// Nodes in registration order, edges grouped by source in the same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub node_count: usize,
    pub edge_count: usize,
}

impl Snapshot {
    #[cfg(test)]
    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeView> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }
}
