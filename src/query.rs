//! Read-only queries: entity neighborhood, relationship-type filter, shortest path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::{shortest_path, KnowledgeGraph};
use crate::{KgError, Result};

/// Separator between the endpoints of a path query value.
pub const PATH_SEPARATOR: &str = " to ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Entity,
    Relationship,
    Path,
}

impl FromStr for QueryKind {
    type Err = KgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "entity" => Ok(QueryKind::Entity),
            "relationship" => Ok(QueryKind::Relationship),
            "path" => Ok(QueryKind::Path),
            "" => Err(KgError::Validation(
                "Query type and value are required".to_string(),
            )),
            other => Err(KgError::Validation(format!(
                "Unknown query type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::Entity => "entity",
            QueryKind::Relationship => "relationship",
            QueryKind::Path => "path",
        };
        f.write_str(name)
    }
}

/// A validated query. The value is already trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Every connection touching this entity.
    Entity(String),
    /// Every connection whose label matches, case-insensitively.
    Relationship(String),
    /// Raw `"<start> to <end>"` text; malformed values produce no results.
    Path(String),
}

impl Query {
    pub fn new(kind: QueryKind, value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(KgError::Validation(
                "Query type and value are required".to_string(),
            ));
        }
        let value = value.to_string();
        Ok(match kind {
            QueryKind::Entity => Query::Entity(value),
            QueryKind::Relationship => Query::Relationship(value),
            QueryKind::Path => Query::Path(value),
        })
    }

    /// Parse a loosely typed `(type, value)` pair as received from a caller.
    pub fn parse(kind: &str, value: &str) -> Result<Self> {
        Self::new(kind.parse()?, value)
    }

    pub fn kind(&self) -> QueryKind {
        match self {
            Query::Entity(_) => QueryKind::Entity,
            Query::Relationship(_) => QueryKind::Relationship,
            Query::Path(_) => QueryKind::Path,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Query::Entity(v) | Query::Relationship(v) | Query::Path(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One matching connection. `direction` is only set for entity queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionMatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub source: String,
    pub relationship: String,
    pub target: String,
}

/// Result of a well-formed path query. `path` is `null` when unreachable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathOutcome {
    pub path: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PathOutcome {
    fn found(path: Vec<String>) -> Self {
        let length = path.len().saturating_sub(1);
        Self {
            path: Some(path),
            length: Some(length),
            message: None,
        }
    }

    fn unreachable(start: &str, end: &str) -> Self {
        Self {
            path: None,
            length: None,
            message: Some(format!("No path found between {} and {}", start, end)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResults {
    Connections(Vec<ConnectionMatch>),
    Path(PathOutcome),
}

impl QueryResults {
    /// List length for connection results; a path outcome counts as one.
    pub fn count(&self) -> usize {
        match self {
            QueryResults::Connections(matches) => matches.len(),
            QueryResults::Path(_) => 1,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryResults::Connections(m) if m.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub query_type: QueryKind,
    pub query_value: String,
    pub results: QueryResults,
    pub result_count: usize,
}

/// Run `query` against a consistent view of the graph.
///
/// Only fails on a broken internal invariant; bad input yields empty results.
pub fn execute(graph: &KnowledgeGraph, query: &Query) -> Result<QueryResponse> {
    let results = match query {
        Query::Entity(id) => entity_connections(graph, id),
        Query::Relationship(label) => connections_labeled(graph, label),
        Query::Path(value) => match split_path(value) {
            Some((start, end)) if graph.has_entity(start) && graph.has_entity(end) => {
                QueryResults::Path(match shortest_path(graph, start, end)? {
                    Some(path) => PathOutcome::found(path),
                    None => PathOutcome::unreachable(start, end),
                })
            }
            _ => QueryResults::Connections(Vec::new()),
        },
    };

    log::debug!(
        "Query {} '{}' returned {} result(s)",
        query.kind(),
        query.value(),
        results.count()
    );

    Ok(QueryResponse {
        query_type: query.kind(),
        query_value: query.value().to_string(),
        result_count: results.count(),
        results,
    })
}

/// Outgoing connections first, then incoming, each in insertion order.
fn entity_connections(graph: &KnowledgeGraph, id: &str) -> QueryResults {
    if !graph.has_entity(id) {
        return QueryResults::Connections(Vec::new());
    }
    let store = graph.relationships();

    let outgoing = store.outgoing(id).map(|(target, c)| ConnectionMatch {
        direction: Some(Direction::Outgoing),
        source: id.to_string(),
        relationship: c.label.clone(),
        target: target.to_string(),
    });
    let incoming = store.incoming(id).map(|(source, c)| ConnectionMatch {
        direction: Some(Direction::Incoming),
        source: source.to_string(),
        relationship: c.label.clone(),
        target: id.to_string(),
    });

    QueryResults::Connections(outgoing.chain(incoming).collect())
}

fn connections_labeled(graph: &KnowledgeGraph, label: &str) -> QueryResults {
    let wanted = label.trim().to_lowercase();
    QueryResults::Connections(
        graph
            .connections()
            .filter(|c| c.label().to_lowercase() == wanted)
            .map(|c| ConnectionMatch {
                direction: None,
                source: c.source.to_string(),
                relationship: c.label().to_string(),
                target: c.target.to_string(),
            })
            .collect(),
    )
}

/// Split `"<start> to <end>"` into two trimmed, non-empty endpoints.
fn split_path(value: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = value.split(PATH_SEPARATOR).collect();
    match parts.as_slice() {
        [start, end] => {
            let (start, end) = (start.trim(), end.trim());
            (!start.is_empty() && !end.is_empty()).then_some((start, end))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.add_relationship("Alice", "Knows", "Bob").unwrap();
        graph.add_relationship("Carol", "manages", "Alice").unwrap();
        graph.add_relationship("Bob", "knows", "Dave").unwrap();
        graph
    }

    fn run(graph: &KnowledgeGraph, kind: &str, value: &str) -> QueryResponse {
        execute(graph, &Query::parse(kind, value).unwrap()).unwrap()
    }

    #[test]
    fn test_entity_query_outgoing_first() {
        let graph = sample();
        let response = run(&graph, "entity", "Alice");
        let QueryResults::Connections(matches) = &response.results else {
            panic!("expected connection list");
        };
        assert_eq!(response.result_count, 2);
        assert_eq!(matches[0].direction, Some(Direction::Outgoing));
        assert_eq!(matches[0].target, "Bob");
        assert_eq!(matches[1].direction, Some(Direction::Incoming));
        assert_eq!(matches[1].source, "Carol");
        assert_eq!(matches[1].relationship, "manages");
    }

    #[test]
    fn test_entity_query_order_survives_delete() {
        let mut graph = KnowledgeGraph::new();
        for (source, target) in [
            ("X", "P"),
            ("X", "Q"),
            ("X", "R"),
            ("A", "X"),
            ("B", "X"),
            ("C", "X"),
        ] {
            graph.add_relationship(source, "r", target).unwrap();
        }
        graph.delete_relationship("X", "P").unwrap();
        graph.delete_relationship("A", "X").unwrap();

        let response = run(&graph, "entity", "X");
        let QueryResults::Connections(matches) = &response.results else {
            panic!("expected connection list");
        };
        let order: Vec<_> = matches
            .iter()
            .map(|m| (m.source.as_str(), m.target.as_str()))
            .collect();
        assert_eq!(order, vec![("X", "Q"), ("X", "R"), ("B", "X"), ("C", "X")]);
    }

    #[test]
    fn test_entity_query_unknown_entity() {
        let graph = sample();
        let response = run(&graph, "entity", "Zed");
        assert!(response.results.is_empty());
        assert_eq!(response.result_count, 0);
    }

    #[test]
    fn test_relationship_query_case_insensitive() {
        let graph = sample();
        let response = run(&graph, "relationship", "  knows ");
        let QueryResults::Connections(matches) = &response.results else {
            panic!("expected connection list");
        };
        let labels: Vec<_> = matches.iter().map(|m| m.relationship.as_str()).collect();
        assert_eq!(labels, vec!["Knows", "knows"]);
        assert!(matches.iter().all(|m| m.direction.is_none()));
    }

    #[test]
    fn test_path_query_found() {
        let mut graph = KnowledgeGraph::new();
        graph.add_relationship("A", "r", "B").unwrap();
        graph.add_relationship("B", "r", "C").unwrap();
        let response = run(&graph, "path", "A to C");
        assert_eq!(
            response.results,
            QueryResults::Path(PathOutcome {
                path: Some(vec!["A".into(), "B".into(), "C".into()]),
                length: Some(2),
                message: None,
            })
        );
        assert_eq!(response.result_count, 1);
    }

    #[test]
    fn test_path_query_disjoint() {
        let mut graph = KnowledgeGraph::new();
        graph.add_relationship("A", "r", "B").unwrap();
        graph.add_relationship("C", "r", "D").unwrap();
        let response = run(&graph, "path", "A to D");
        let QueryResults::Path(outcome) = &response.results else {
            panic!("expected path outcome");
        };
        assert!(outcome.path.is_none());
        assert_eq!(
            outcome.message.as_deref(),
            Some("No path found between A and D")
        );
        let json = serde_json::to_value(&response.results).unwrap();
        assert!(json["path"].is_null());
    }

    #[test]
    fn test_path_query_malformed_yields_no_results() {
        let graph = sample();
        for value in [
            "Alice",
            "Alice to",
            "Alice to Bob to Dave",
            "Alice to Nobody",
            "Alice->Bob",
        ] {
            let response = run(&graph, "path", value);
            assert!(response.results.is_empty(), "value {:?}", value);
        }
    }

    #[test]
    fn test_blank_inputs_rejected() {
        assert!(matches!(Query::parse("", "Alice"), Err(KgError::Validation(_))));
        assert!(matches!(Query::parse("entity", "   "), Err(KgError::Validation(_))));
        assert!(matches!(Query::parse("neighbors", "Alice"), Err(KgError::Validation(_))));
    }

    #[test]
    fn test_kind_parsing_is_lenient() {
        assert_eq!(" Entity ".parse::<QueryKind>().unwrap(), QueryKind::Entity);
        assert_eq!("PATH".parse::<QueryKind>().unwrap(), QueryKind::Path);
    }

    #[test]
    fn test_response_serialization() {
        let graph = sample();
        let json = serde_json::to_value(run(&graph, "entity", "Bob")).unwrap();
        assert_eq!(json["query_type"], "entity");
        assert_eq!(json["query_value"], "Bob");
        assert_eq!(json["results"][0]["type"], "outgoing");
        assert_eq!(json["results"][1]["type"], "incoming");
    }
}
