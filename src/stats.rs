//! Aggregate structural statistics for the knowledge graph.
//!
//! - **density**: `edge_count / (node_count * (node_count - 1))`, the ratio of
//!   existing directed connections to the maximum possible. 0.0 for graphs
//!   with fewer than two nodes.
//! - **is_strongly_connected**: every entity reaches every other entity.
//!   False for an empty graph.
//! - **num_components**: number of strongly connected components (Tarjan).
//!   0 for an empty graph, at least 1 otherwise.
//! - **avg_degree**: mean of in-degree + out-degree over all entities.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::graph::KnowledgeGraph;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    #[serde(rename = "is_connected")]
    pub is_strongly_connected: bool,
    pub num_components: usize,
    pub avg_degree: f64,
}

impl GraphStats {
    pub fn compute(graph: &KnowledgeGraph) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let num_components = tarjan_scc(&to_petgraph(graph)).len();

        // every connection contributes one out-degree and one in-degree
        let store = graph.relationships();
        let degree_sum: usize = graph
            .entities()
            .iter()
            .map(|e| store.out_degree(&e.id) + store.in_degree(&e.id))
            .sum();
        let avg_degree = if node_count == 0 {
            0.0
        } else {
            degree_sum as f64 / node_count as f64
        };

        Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            is_strongly_connected: node_count > 0 && num_components == 1,
            num_components,
            avg_degree,
        }
    }
}

fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count <= 1 {
        return 0.0;
    }
    let n = node_count as f64;
    edge_count as f64 / (n * (n - 1.0))
}

fn to_petgraph(graph: &KnowledgeGraph) -> DiGraph<&str, ()> {
    let mut pg = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    let index: HashMap<&str, NodeIndex> = graph
        .entities()
        .iter()
        .map(|e| (e.id.as_str(), pg.add_node(e.id.as_str())))
        .collect();

    for c in graph.connections() {
        if let (Some(&a), Some(&b)) = (index.get(c.source), index.get(c.target)) {
            pg.add_edge(a, b, ());
        }
    }
    pg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(edges: &[(&str, &str)]) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        for (source, target) in edges {
            graph.add_relationship(source, "links", target).unwrap();
        }
        graph
    }

    #[test]
    fn test_empty_graph() {
        let stats = GraphStats::compute(&KnowledgeGraph::new());
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert_eq!(stats.density, 0.0);
        assert_eq!(stats.avg_degree, 0.0);
        assert!(!stats.is_strongly_connected);
        assert_eq!(stats.num_components, 0);
    }

    #[test]
    fn test_single_self_loop() {
        let stats = GraphStats::compute(&graph_with(&[("A", "A")]));
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.density, 0.0);
        assert!(stats.is_strongly_connected);
        assert_eq!(stats.num_components, 1);
        assert_eq!(stats.avg_degree, 2.0);
    }

    #[test]
    fn test_chain_is_not_strongly_connected() {
        let stats = GraphStats::compute(&graph_with(&[("A", "B"), ("B", "C")]));
        assert_eq!(stats.num_components, 3);
        assert!(!stats.is_strongly_connected);
        assert!((stats.density - 2.0 / 6.0).abs() < 1e-9);
        assert!((stats.avg_degree - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_cycle_is_strongly_connected() {
        let graph = graph_with(&[("A", "B"), ("B", "C"), ("C", "A")]);
        let stats = GraphStats::compute(&graph);
        assert_eq!(stats.num_components, 1);
        assert!(stats.is_strongly_connected);
        assert!((stats.density - 0.5).abs() < 1e-9);
        assert_eq!(stats.avg_degree, 2.0);
    }

    #[test]
    fn test_components_after_delete() {
        let mut graph = graph_with(&[("A", "B"), ("B", "A"), ("C", "D")]);
        assert_eq!(GraphStats::compute(&graph).num_components, 3);
        graph.delete_relationship("B", "A").unwrap();
        let stats = GraphStats::compute(&graph);
        assert_eq!(stats.num_components, 4);
        assert_eq!(stats.node_count, 4);
    }

    #[test]
    fn test_serialized_keys() {
        let stats = GraphStats::compute(&graph_with(&[("A", "B")]));
        let json = serde_json::to_value(stats).unwrap();
        for key in [
            "node_count",
            "edge_count",
            "density",
            "is_connected",
            "num_components",
            "avg_degree",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
