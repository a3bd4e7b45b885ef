pub mod config;
pub mod error;
pub mod graph;
pub mod http;
pub mod ingest;
pub mod query;
pub mod service;
pub mod stats;

pub use config::Config;
pub use error::{KgError, Result};
pub use graph::{KnowledgeGraph, Snapshot};
pub use ingest::{bulk_add, BulkReport, CandidateRow};
pub use query::{Query, QueryKind, QueryResponse, QueryResults};
pub use service::GraphService;
pub use stats::GraphStats;
