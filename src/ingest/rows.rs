//! Resolve decoded tabular records into candidate relationship rows.
//!
//! Header names are matched case- and whitespace-insensitively, so
//! `Entity1`, `entity 1` and ` ENTITY 1 ` all name the first entity.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Entity1,
    Relationship,
    Entity2,
}

fn field_for_header(header: &str) -> Option<Field> {
    let key: String = header
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    match key.as_str() {
        "entity1" => Some(Field::Entity1),
        "relationship" => Some(Field::Relationship),
        "entity2" => Some(Field::Entity2),
        _ => None,
    }
}

/// One row offered to bulk ingestion. Blank values are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateRow {
    pub entity1: Option<String>,
    pub relationship: Option<String>,
    pub entity2: Option<String>,
    /// Trimmed header names seen on the record, for error reporting.
    pub headers: Vec<String>,
}

impl CandidateRow {
    pub fn new(entity1: &str, relationship: &str, entity2: &str) -> Self {
        Self {
            entity1: non_blank(entity1),
            relationship: non_blank(relationship),
            entity2: non_blank(entity2),
            headers: vec![
                "entity1".to_string(),
                "relationship".to_string(),
                "entity2".to_string(),
            ],
        }
    }

    /// Build a row from `(header, value)` pairs in column order.
    ///
    /// The first non-blank value for each field wins; unknown headers are
    /// kept only in `headers`.
    pub fn from_record<I, K, V>(record: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut row = Self::default();
        for (header, value) in record {
            let header = header.as_ref().trim();
            row.headers.push(header.to_string());

            let slot = match field_for_header(header) {
                Some(Field::Entity1) => &mut row.entity1,
                Some(Field::Relationship) => &mut row.relationship,
                Some(Field::Entity2) => &mut row.entity2,
                None => continue,
            };
            if slot.is_none() {
                *slot = non_blank(value.as_ref());
            }
        }
        row
    }

    /// The three fields, if all are present.
    pub fn fields(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.entity1.as_deref()?,
            self.relationship.as_deref()?,
            self.entity2.as_deref()?,
        ))
    }
}

fn non_blank(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_header_variants() {
        for (e1, rel, e2) in [
            ("Entity1", "Relationship", "Entity2"),
            ("entity1", "relationship", "entity2"),
            ("Entity 1", "RELATIONSHIP", "entity 2"),
            ("  entity 1 ", " Relationship", "Entity2  "),
        ] {
            let row = CandidateRow::from_record([(e1, "A"), (rel, "r"), (e2, "B")]);
            assert_eq!(row.fields(), Some(("A", "r", "B")), "headers {:?}", row.headers);
        }
    }

    #[test]
    fn test_blank_value_is_missing() {
        let row = CandidateRow::from_record([
            ("Entity1", "A"),
            ("Relationship", "  "),
            ("Entity2", "B"),
        ]);
        assert_eq!(row.relationship, None);
        assert_eq!(row.fields(), None);
    }

    #[test]
    fn test_missing_column_keeps_seen_headers() {
        let mut record = IndexMap::new();
        record.insert(" Source ".to_string(), "A".to_string());
        record.insert("Relationship".to_string(), "r".to_string());
        record.insert("Entity2".to_string(), "B".to_string());
        let row = CandidateRow::from_record(&record);
        assert_eq!(row.fields(), None);
        assert_eq!(row.headers, vec!["Source", "Relationship", "Entity2"]);
    }

    #[test]
    fn test_first_non_blank_value_wins() {
        let row = CandidateRow::from_record([
            ("entity1", ""),
            ("Entity 1", "A"),
            ("Entity1", "ignored"),
            ("relationship", "r"),
            ("entity2", "B"),
        ]);
        assert_eq!(row.fields(), Some(("A", "r", "B")));
    }

    #[test]
    fn test_new_keeps_raw_values() {
        let row = CandidateRow::new(" A ", "r", "");
        assert_eq!(row.entity1.as_deref(), Some(" A "));
        assert_eq!(row.entity2, None);
    }
}
