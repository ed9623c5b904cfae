//! Header/row alignment against the resolved destination schema.
//!
//! The header is cleaned and reconciled once per job: any header field whose
//! cleaned name has no schema counterpart lands in the drop-set, and every
//! subsequent row excludes those indices. Rows whose surviving field count
//! does not line up with the surviving columns are rejected for the caller
//! to count and report.

use std::collections::HashSet;

use crate::{catalog::ColumnSchema, sanitize::scrub_field};

/// Whether a row that aligns to zero columns is still accepted.
///
/// The default rejects; the knob keeps the permissive behavior available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionPolicy {
    pub allow_empty_rows: bool,
}

#[derive(Debug)]
pub struct RowProjector {
    columns: Vec<String>,
    drop_set: HashSet<usize>,
    header_len: usize,
    policy: ProjectionPolicy,
}

impl RowProjector {
    /// Cleans the raw header and computes the drop-set against the schema's
    /// column names (exact, case-sensitive match).
    pub fn new(raw_header: &[String], schema: &[ColumnSchema], policy: ProjectionPolicy) -> Self {
        let schema_names: HashSet<&str> = schema.iter().map(|col| col.name.as_str()).collect();
        let cleaned: Vec<String> = raw_header.iter().map(|field| scrub_field(field)).collect();
        let drop_set: HashSet<usize> = cleaned
            .iter()
            .enumerate()
            .filter(|(_, name)| !schema_names.contains(name.as_str()))
            .map(|(ix, _)| ix)
            .collect();
        let columns = cleaned
            .into_iter()
            .enumerate()
            .filter(|(ix, _)| !drop_set.contains(ix))
            .map(|(_, name)| name)
            .collect();
        Self {
            columns,
            drop_set,
            header_len: raw_header.len(),
            policy,
        }
    }

    /// Header names that survived reconciliation, in original header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Cleans a data row and excludes drop-set indices. Returns `None` for
    /// rows whose aligned length does not match the aligned columns (or that
    /// align to nothing, unless the policy allows it).
    pub fn project(&self, raw_row: &[String]) -> Option<Vec<String>> {
        let aligned: Vec<String> = raw_row
            .iter()
            .enumerate()
            .filter(|(ix, _)| !self.drop_set.contains(ix))
            .map(|(_, field)| scrub_field(field))
            .collect();
        let accepted = aligned.len() == self.columns.len()
            && (self.policy.allow_empty_rows || !aligned.is_empty());
        accepted.then_some(aligned)
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> Vec<ColumnSchema> {
        names
            .iter()
            .map(|name| ColumnSchema::new(*name, "varchar"))
            .collect()
    }

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn unknown_header_columns_join_the_drop_set() {
        let projector = RowProjector::new(
            &fields(&["Name", "Age", "Notes"]),
            &schema(&["Name", "Age"]),
            ProjectionPolicy::default(),
        );
        assert_eq!(projector.columns(), &["Name", "Age"]);

        let row = projector.project(&fields(&["Ada", "36", "ignored"])).unwrap();
        assert_eq!(row, fields(&["Ada", "36"]));
    }

    #[test]
    fn header_fields_are_cleaned_before_matching() {
        let projector = RowProjector::new(
            &fields(&["\"Name\"", "Ag\u{e9}e"]),
            &schema(&["Name", "Age"]),
            ProjectionPolicy::default(),
        );
        // `Agée` cleans to `Age` and matches; the quoted name cleans to `Name`.
        assert_eq!(projector.columns(), &["Name", "Age"]);
    }

    #[test]
    fn short_rows_are_rejected_not_padded() {
        let projector = RowProjector::new(
            &fields(&["Name", "Age"]),
            &schema(&["Name", "Age"]),
            ProjectionPolicy::default(),
        );
        assert!(projector.project(&fields(&["only-one"])).is_none());
        assert!(projector.project(&fields(&["a", "b", "c"])).is_none());
    }

    #[test]
    fn zero_length_rows_follow_the_policy() {
        let projector = RowProjector::new(
            &fields(&["Unknown"]),
            &schema(&["Name"]),
            ProjectionPolicy::default(),
        );
        assert!(projector.project(&fields(&["x"])).is_none());

        let permissive = RowProjector::new(
            &fields(&["Unknown"]),
            &schema(&["Name"]),
            ProjectionPolicy {
                allow_empty_rows: true,
            },
        );
        assert_eq!(permissive.project(&fields(&["x"])), Some(Vec::new()));
    }

    #[test]
    fn row_values_are_cleaned_like_headers() {
        let projector = RowProjector::new(
            &fields(&["Name"]),
            &schema(&["Name"]),
            ProjectionPolicy::default(),
        );
        let row = projector.project(&fields(&["O'Brien"])).unwrap();
        assert_eq!(row, fields(&["OBrien"]));
    }
}
