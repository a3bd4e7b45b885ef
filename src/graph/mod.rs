//! Knowledge graph engine: entity registry, relationship store, BFS traversal.
//!
//! The engine is the sole mutator of both maps. Entities appear on first
//! reference from a relationship and survive deletion of that relationship;
//! only [`KnowledgeGraph::clear_all`] removes them.

mod registry;
mod snapshot;
mod store;
mod traversal;

pub use registry::{Entity, EntityKind, EntityMetadata, EntityRegistry};
pub use snapshot::{EdgeView, NodeView, Snapshot};
pub use store::{Connection, RelationshipMetadata, RelationshipStore, Upsert};
pub use traversal::shortest_path;

use crate::{KgError, Result};

/// A connection seen from the outside: `source --label--> target`.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionRef<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub connection: &'a Connection,
}

impl ConnectionRef<'_> {
    pub fn label(&self) -> &str {
        &self.connection.label
    }
}

/// In-memory directed knowledge graph.
#[derive(Debug, Default)]
pub struct KnowledgeGraph {
    entities: EntityRegistry,
    relationships: RelationshipStore,
}

/// Trim `value` and reject it if nothing is left.
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(KgError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entity1 --relationship--> entity2`, creating either entity as needed.
    ///
    /// An existing connection between the same ordered pair is relabeled
    /// rather than duplicated. Returns the confirmation message.
    pub fn add_relationship(
        &mut self,
        entity1: &str,
        relationship: &str,
        entity2: &str,
    ) -> Result<String> {
        let (source, label, target) = match (
            required("entity1", entity1),
            required("relationship", relationship),
            required("entity2", entity2),
        ) {
            (Ok(s), Ok(l), Ok(t)) => (s, l, t),
            _ => return Err(KgError::Validation("All fields are required".to_string())),
        };

        self.entities.ensure(source);
        self.entities.ensure(target);
        match self.relationships.upsert(source, target, label) {
            Upsert::Created => log::debug!("Added {} --{}--> {}", source, label, target),
            Upsert::Unchanged => log::debug!("Refreshed {} --{}--> {}", source, label, target),
            Upsert::Relabeled { previous } => log::debug!(
                "Relabeled {} -> {} from '{}' to '{}'",
                source,
                target,
                previous,
                label
            ),
        }

        Ok(format!(
            "Relationship added: {} --{}--> {}",
            source, label, target
        ))
    }

    /// Remove the connection from `source` to `target`. Both entities stay.
    pub fn delete_relationship(&mut self, source: &str, target: &str) -> Result<String> {
        let source = required("source", source)?;
        let target = required("target", target)?;

        for id in [source, target] {
            if !self.entities.contains(id) {
                return Err(KgError::NotFound(format!("entity '{}'", id)));
            }
        }

        match self.relationships.remove(source, target) {
            Some(removed) => {
                log::debug!("Removed {} --{}--> {}", source, removed.label, target);
                Ok(format!("Relationship removed: {} -> {}", source, target))
            }
            None => Err(KgError::NotFound(format!(
                "relationship {} -> {}",
                source, target
            ))),
        }
    }

    /// Drop every entity and connection.
    pub fn clear_all(&mut self) {
        if self.entities.is_empty() && self.relationships.is_empty() {
            log::debug!("Knowledge graph already empty");
            return;
        }
        log::info!(
            "Clearing knowledge graph ({} entities, {} relationships)",
            self.entities.len(),
            self.relationships.len()
        );
        self.relationships.clear();
        self.entities.clear();
    }

    pub fn snapshot(&self) -> Snapshot {
        let nodes: Vec<NodeView> = self
            .entities
            .iter()
            .map(|e| NodeView {
                id: e.id.clone(),
                label: e.id.clone(),
                metadata: e.metadata.clone(),
            })
            .collect();
        let edges: Vec<EdgeView> = self
            .connections()
            .map(|c| EdgeView {
                source: c.source.to_string(),
                target: c.target.to_string(),
                label: c.connection.label.clone(),
                metadata: c.connection.metadata.clone(),
            })
            .collect();

        Snapshot {
            node_count: nodes.len(),
            edge_count: edges.len(),
            nodes,
            edges,
        }
    }

    /// Every connection, grouped by source in entity registration order.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionRef<'_>> {
        self.entities.iter().flat_map(move |entity| {
            self.relationships
                .outgoing(&entity.id)
                .map(move |(target, connection)| ConnectionRef {
                    source: &entity.id,
                    target,
                    connection,
                })
        })
    }

    pub fn has_entity(&self, id: &str) -> bool {
        self.entities.contains(id)
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn relationships(&self) -> &RelationshipStore {
        &self.relationships
    }

    pub fn node_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.relationships.len()
    }
}
