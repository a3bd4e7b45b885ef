//! Relationship store: directed labeled connections, at most one per ordered pair.

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Annotations attached to a connection. Refreshed on every upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipMetadata {
    pub created_at: DateTime<Utc>,
}

/// The single active connection between an ordered pair of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub label: String,
    pub metadata: RelationshipMetadata,
}

/// What an upsert did to the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Unchanged,
    Relabeled { previous: String },
}

/// Adjacency in both directions. Metadata lives on the connection itself, so
/// it is keyed by the ordered pair and a relabel overwrites it in place.
#[derive(Debug, Default)]
pub struct RelationshipStore {
    outgoing: IndexMap<String, IndexMap<String, Connection>>,
    incoming: IndexMap<String, IndexSet<String>>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the (source, target) connection or overwrite its label.
    ///
    /// A relabeled connection keeps its position in iteration order.
    pub fn upsert(&mut self, source: &str, target: &str, label: &str) -> Upsert {
        let metadata = RelationshipMetadata {
            created_at: Utc::now(),
        };
        let targets = self.outgoing.entry(source.to_string()).or_default();

        match targets.get_mut(target) {
            Some(existing) => {
                let outcome = if existing.label == label {
                    Upsert::Unchanged
                } else {
                    Upsert::Relabeled {
                        previous: std::mem::replace(&mut existing.label, label.to_string()),
                    }
                };
                existing.metadata = metadata;
                outcome
            }
            None => {
                targets.insert(
                    target.to_string(),
                    Connection {
                        label: label.to_string(),
                        metadata,
                    },
                );
                self.incoming
                    .entry(target.to_string())
                    .or_default()
                    .insert(source.to_string());
                Upsert::Created
            }
        }
    }

    /// Delete the (source, target) connection, returning it if it existed.
    pub fn remove(&mut self, source: &str, target: &str) -> Option<Connection> {
        let targets = self.outgoing.get_mut(source)?;
        let removed = targets.shift_remove(target)?;
        if targets.is_empty() {
            self.outgoing.shift_remove(source);
        }

        if let Some(sources) = self.incoming.get_mut(target) {
            sources.shift_remove(source);
            if sources.is_empty() {
                self.incoming.shift_remove(target);
            }
        }

        Some(removed)
    }

    pub fn get(&self, source: &str, target: &str) -> Option<&Connection> {
        self.outgoing.get(source)?.get(target)
    }

    /// Connections leaving `source`, in insertion order.
    pub fn outgoing<'a>(
        &'a self,
        source: &str,
    ) -> impl Iterator<Item = (&'a str, &'a Connection)> + 'a {
        self.outgoing
            .get(source)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(t, c)| (t.as_str(), c)))
    }

    /// Connections arriving at `target` as `(source, connection)`, in insertion order.
    pub fn incoming<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Connection)> + 'a {
        self.incoming
            .get(target)
            .into_iter()
            .flat_map(|sources| sources.iter())
            .filter_map(move |source| {
                self.get(source, target)
                    .map(|connection| (source.as_str(), connection))
            })
    }

    pub fn out_degree(&self, source: &str) -> usize {
        self.outgoing.get(source).map_or(0, IndexMap::len)
    }

    pub fn in_degree(&self, target: &str) -> usize {
        self.incoming.get(target).map_or(0, IndexSet::len)
    }

    pub fn len(&self) -> usize {
        self.outgoing.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }

    pub fn clear(&mut self) {
        self.outgoing.clear();
        self.incoming.clear();
    }
}
