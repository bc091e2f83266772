//! Structural stage: null, type, and shape conformance per record.

use crate::record::Record;
use crate::schema::TableSchema;

use super::verdict::Verdict;
use super::{StageContext, StageFilter, StageOutcome};

/// Rejects records with missing values, type mismatches, or ragged shapes.
///
/// Checks are independent per record; the candidate set is processed in
/// original batch order.
pub struct StructuralFilter;

impl StageFilter for StructuralFilter {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn apply(
        &self,
        records: Vec<Record>,
        schema: &TableSchema,
        _ctx: &StageContext,
    ) -> StageOutcome {
        let mut admitted = Vec::with_capacity(records.len());
        let mut verdicts = Vec::with_capacity(records.len());

        for record in records {
            match check_record(&record, schema) {
                None => {
                    verdicts.push(Verdict::admit(record.id, self.name()));
                    admitted.push(record);
                }
                Some(reason) => {
                    verdicts.push(Verdict::reject(record.id, self.name(), reason));
                }
            }
        }

        StageOutcome { admitted, verdicts }
    }
}

/// Returns the first structural problem found, or None if the record is clean.
fn check_record(record: &Record, schema: &TableSchema) -> Option<String> {
    if record.len() != schema.column_count() {
        return Some(format!(
            "ragged row: expected {} values, found {}",
            schema.column_count(),
            record.len()
        ));
    }

    for (column, value) in schema.columns.iter().zip(record.iter_values()) {
        if value.is_missing() {
            return Some(format!("missing value in column '{}'", column.name));
        }
        if !column.declared_type.accepts(value) {
            return Some(format!(
                "column '{}' expects {}, found {}",
                column.name,
                column.declared_type.sql_type(),
                value.kind_label()
            ));
        }
    }

    None
}
