//! Entity registry: identity lookup and per-entity metadata.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category tag carried by every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Entity,
}

/// Annotations recorded when an entity is first seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

/// A named node in the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: String,
    pub metadata: EntityMetadata,
}

/// Entities keyed by identity, iterated in registration order.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: IndexMap<String, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entity named `id`, creating it on first sight.
    ///
    /// `id` must already be trimmed and non-empty; the graph engine
    /// validates before calling in.
    pub fn ensure(&mut self, id: &str) -> &Entity {
        if !self.entities.contains_key(id) {
            log::debug!("Registering entity: {}", id);
        }
        self.entities
            .entry(id.to_string())
            .or_insert_with(|| Entity {
                id: id.to_string(),
                metadata: EntityMetadata {
                    created_at: Utc::now(),
                    kind: EntityKind::Entity,
                },
            })
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
