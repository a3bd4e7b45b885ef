//! Bulk ingestion: apply many candidate rows, collecting per-row failures.

pub mod rows;

pub use rows::CandidateRow;

use serde::{Serialize, Serializer};

use crate::graph::{KnowledgeGraph, Snapshot};
use crate::KgError;

/// Row number reported for the first data row (the header line is row 1).
pub const DEFAULT_FIRST_ROW_NUMBER: usize = 2;

/// Outcome of a bulk ingestion. `errors` holds one [`KgError::Row`] per
/// rejected row, in input order.
#[derive(Debug, Serialize)]
pub struct BulkReport {
    pub added_count: usize,
    #[serde(serialize_with = "serialize_messages")]
    pub errors: Vec<KgError>,
    pub graph: Snapshot,
}

impl BulkReport {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn serialize_messages<S: Serializer>(errors: &[KgError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Apply `rows` in order. A bad row is recorded and skipped; it never aborts
/// the batch.
pub fn bulk_add<I>(graph: &mut KnowledgeGraph, rows: I, first_row_number: usize) -> BulkReport
where
    I: IntoIterator<Item = CandidateRow>,
{
    let mut added_count = 0;
    let mut errors = Vec::new();

    for (row_number, row) in (first_row_number..).zip(rows) {
        let Some((entity1, relationship, entity2)) = row.fields() else {
            let err = KgError::Row {
                row: row_number,
                reason: format!("Missing required fields (Found: [{}])", row.headers.join(", ")),
            };
            log::warn!("{}", err);
            errors.push(err);
            continue;
        };

        match graph.add_relationship(entity1, relationship, entity2) {
            Ok(_) => added_count += 1,
            Err(e) => {
                let err = KgError::Row {
                    row: row_number,
                    reason: format!("Failed to add relationship: {}", e),
                };
                log::warn!("{}", err);
                errors.push(err);
            }
        }
    }

    log::info!(
        "Bulk ingestion finished: {} added, {} failed",
        added_count,
        errors.len()
    );

    BulkReport {
        added_count,
        errors,
        graph: graph.snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_row_is_reported() {
        let mut graph = KnowledgeGraph::new();
        let rows = vec![
            CandidateRow::new("A", "r", "B"),
            CandidateRow::new("B", "", "C"),
            CandidateRow::new("C", "r", "D"),
        ];
        let report = bulk_add(&mut graph, rows, DEFAULT_FIRST_ROW_NUMBER);

        assert_eq!(report.added_count, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(report.errors[0], KgError::Row { row: 3, .. }));
        assert!(report.error_messages()[0].starts_with("Row 3: Missing required fields"));
        assert_eq!(report.graph.edge_count, 2);
        assert_eq!(report.graph.node_count, 4);
    }

    #[test]
    fn test_row_numbers_follow_offset() {
        let mut graph = KnowledgeGraph::new();
        let rows = vec![
            CandidateRow::new("A", "r", "B"),
            CandidateRow::from_record([("Entity1", "B"), ("Entity2", "C")]),
            CandidateRow::new("C", "r", "D"),
        ];
        let report = bulk_add(&mut graph, rows, 1);
        assert!(matches!(report.errors[0], KgError::Row { row: 2, .. }));
        assert_eq!(
            report.error_messages()[0],
            "Row 2: Missing required fields (Found: [Entity1, Entity2])"
        );
    }

    #[test]
    fn test_all_rows_failing_leaves_graph_untouched() {
        let mut graph = KnowledgeGraph::new();
        let rows = vec![CandidateRow::default(), CandidateRow::default()];
        let report = bulk_add(&mut graph, rows, DEFAULT_FIRST_ROW_NUMBER);
        assert_eq!(report.added_count, 0);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.graph.node_count, 0);
    }

    #[test]
    fn test_relabel_within_batch_counts_each_row() {
        let mut graph = KnowledgeGraph::new();
        let rows = vec![
            CandidateRow::new("A", "likes", "B"),
            CandidateRow::new("A", "loves", "B"),
        ];
        let report = bulk_add(&mut graph, rows, DEFAULT_FIRST_ROW_NUMBER);
        assert_eq!(report.added_count, 2);
        assert_eq!(report.graph.edge_count, 1);
        assert_eq!(report.graph.edge("A", "B").unwrap().label, "loves");
    }

    #[test]
    fn test_report_serializes_error_strings() {
        let mut graph = KnowledgeGraph::new();
        let report = bulk_add(&mut graph, vec![CandidateRow::default()], DEFAULT_FIRST_ROW_NUMBER);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["added_count"], 0);
        assert_eq!(json["errors"][0], "Row 2: Missing required fields (Found: [])");
        assert_eq!(json["graph"]["node_count"], 0);
    }
}
