//! Shared graph handle exposing one atomic operation per request.
//!
//! The registry and the relationship store are updated in separate steps, so
//! every public operation (reads included) holds the same exclusive lock for
//! its whole duration. All work is in-memory; no operation blocks on I/O.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::config::Config;
use crate::graph::{KnowledgeGraph, Snapshot};
use crate::ingest::{self, BulkReport, CandidateRow, DEFAULT_FIRST_ROW_NUMBER};
use crate::query::{self, Query, QueryResponse};
use crate::stats::GraphStats;
use crate::{KgError, Result};

/// Confirmation of a single mutation plus the resulting graph.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub message: String,
    pub graph: Snapshot,
}

pub struct GraphService {
    graph: Mutex<KnowledgeGraph>,
    first_row_number: usize,
}

impl Default for GraphService {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphService {
    /// Create a service over an empty graph
    pub fn new() -> Self {
        Self::with_first_row_number(DEFAULT_FIRST_ROW_NUMBER)
    }

    pub fn with_first_row_number(first_row_number: usize) -> Self {
        Self {
            graph: Mutex::new(KnowledgeGraph::new()),
            first_row_number,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_first_row_number(config.ingest.first_row_number)
    }

    fn lock(&self) -> Result<MutexGuard<'_, KnowledgeGraph>> {
        self.graph
            .lock()
            .map_err(|_| KgError::Internal("graph lock poisoned".to_string()))
    }

    pub fn add_relationship(
        &self,
        entity1: &str,
        relationship: &str,
        entity2: &str,
    ) -> Result<MutationOutcome> {
        let mut graph = self.lock()?;
        let message = graph.add_relationship(entity1, relationship, entity2)?;
        Ok(MutationOutcome {
            message,
            graph: graph.snapshot(),
        })
    }

    /// Apply every row under one lock, so readers never see a partial batch.
    pub fn bulk_add<I>(&self, rows: I) -> Result<BulkReport>
    where
        I: IntoIterator<Item = CandidateRow>,
    {
        let mut graph = self.lock()?;
        Ok(ingest::bulk_add(&mut graph, rows, self.first_row_number))
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// Validate a loosely typed `(type, value)` pair and run it.
    pub fn query(&self, kind: &str, value: &str) -> Result<QueryResponse> {
        let query = Query::parse(kind, value)?;
        self.run_query(&query)
    }

    pub fn run_query(&self, query: &Query) -> Result<QueryResponse> {
        let graph = self.lock()?;
        query::execute(&graph, query)
    }

    pub fn delete_relationship(&self, source: &str, target: &str) -> Result<MutationOutcome> {
        let mut graph = self.lock()?;
        let message = graph.delete_relationship(source, target)?;
        Ok(MutationOutcome {
            message,
            graph: graph.snapshot(),
        })
    }

    /// Reset to an empty graph.
    pub fn clear(&self) -> Result<Snapshot> {
        let mut graph = self.lock()?;
        graph.clear_all();
        Ok(graph.snapshot())
    }

    pub fn stats(&self) -> Result<GraphStats> {
        let graph = self.lock()?;
        Ok(GraphStats::compute(&graph))
    }
}
