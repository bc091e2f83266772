//! Ordered stage filters that partition a batch into admitted and rejected.

mod semantic;
mod structural;
mod verdict;

pub use semantic::SemanticFilter;
pub use structural::StructuralFilter;
pub use verdict::{AdmissionResult, Outcome, Verdict};

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::schema::TableSchema;

/// What to do when the candidate set contains duplicate rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Any duplicate rejects every record in the candidate set. Matches the
    /// observed upstream behavior; duplicates are treated as a signal of
    /// batch-wide corruption rather than ordinary repetition.
    #[default]
    RejectAll,
    /// Admit the first occurrence, reject later duplicates as data errors.
    KeepFirst,
    /// Admit the first occurrence, drop later duplicates. Same partition as
    /// `KeepFirst`, but the verdicts mark the rows as dropped repetitions
    /// rather than rejected for cause.
    DropAllButFirst,
}

/// Configuration for the stage filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Upper bound for values in a `price` column.
    pub max_price: f64,
    /// Duplicate handling in the semantic stage.
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_price: 10_000.0,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

/// Shared context passed to every stage.
#[derive(Debug, Clone, Default)]
pub struct StageContext {
    pub filter: FilterConfig,
}

impl StageContext {
    /// Create a context from a filter configuration.
    pub fn new(filter: FilterConfig) -> Self {
        Self { filter }
    }
}

/// Result of applying one stage to a candidate set.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    /// Records that survive into the next stage, in original order.
    pub admitted: Vec<Record>,
    /// One verdict per record evaluated by this stage.
    pub verdicts: Vec<Verdict>,
}

/// A filtering stage of the admission pipeline.
pub trait StageFilter {
    /// Stage name used on verdicts.
    fn name(&self) -> &'static str;

    /// Partition the candidate set into admitted and rejected.
    fn apply(&self, records: Vec<Record>, schema: &TableSchema, ctx: &StageContext)
    -> StageOutcome;
}

/// Run the fixed-order stage pipeline: structural, then semantic.
///
/// Each stage consumes the previous stage's admitted set; verdict traces are
/// concatenated. The semantic stage runs after the structural one because its
/// duplicate and range checks assume well-typed, complete rows.
pub fn run_stages(
    records: Vec<Record>,
    schema: &TableSchema,
    ctx: &StageContext,
) -> (Vec<Record>, Vec<Verdict>) {
    let stages: Vec<Box<dyn StageFilter>> =
        vec![Box::new(StructuralFilter), Box::new(SemanticFilter)];

    let mut verdicts = Vec::new();
    let mut current = records;

    for stage in &stages {
        let outcome = stage.apply(current, schema, ctx);
        verdicts.extend(outcome.verdicts);
        current = outcome.admitted;
    }

    (current, verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use crate::schema::SchemaInferencer;
    use indexmap::IndexMap;

    fn record(id: usize, pairs: Vec<(&str, Value)>) -> Record {
        let values: IndexMap<String, Value> =
            pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Record::new(id, values)
    }

    #[test]
    fn test_stage_order_and_trace_concatenation() {
        let batch = vec![
            record(0, vec![("price", Value::Integer(10)), ("quantity", Value::Integer(5))]),
            record(1, vec![("price", Value::Missing), ("quantity", Value::Integer(1))]),
            record(2, vec![("price", Value::Integer(-5)), ("quantity", Value::Integer(3))]),
        ];
        let schema = SchemaInferencer::infer(&batch, "orders.csv").unwrap();
        let ctx = StageContext::default();

        let (admitted, verdicts) = run_stages(batch, &schema, &ctx);

        // Record 1 never reaches the semantic stage.
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].id, 0);
        let semantic_ids: Vec<usize> = verdicts
            .iter()
            .filter(|v| v.stage == "semantic")
            .map(|v| v.record_id)
            .collect();
        assert_eq!(semantic_ids, vec![0, 2]);
    }

    #[test]
    fn test_monotonic_admission_and_conservation() {
        let batch = vec![
            record(0, vec![("price", Value::Integer(10)), ("quantity", Value::Integer(2))]),
            record(1, vec![("price", Value::Integer(20)), ("quantity", Value::Integer(0))]),
        ];
        let schema = SchemaInferencer::infer(&batch, "orders.csv").unwrap();
        let ctx = StageContext::default();

        let structural = StructuralFilter.apply(batch.clone(), &schema, &ctx);
        assert_eq!(structural.verdicts.len(), batch.len());

        let semantic = SemanticFilter.apply(structural.admitted.clone(), &schema, &ctx);
        assert!(semantic.admitted.len() <= structural.admitted.len());
        assert_eq!(semantic.verdicts.len(), structural.admitted.len());
    }
}
