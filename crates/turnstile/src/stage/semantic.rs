//! Semantic stage: value-range, business-rule, and duplicate checks.

use std::collections::HashMap;

use crate::record::{Record, Value};
use crate::schema::TableSchema;

use super::verdict::Verdict;
use super::{DuplicatePolicy, StageContext, StageFilter, StageOutcome};

/// Applies domain rules over the whole candidate set.
///
/// Per-record checks (`price`, `quantity`) are independent, but duplicate
/// detection needs the complete candidate set, so this stage consumes it as a
/// unit rather than one record at a time.
pub struct SemanticFilter;

impl StageFilter for SemanticFilter {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn apply(
        &self,
        records: Vec<Record>,
        _schema: &TableSchema,
        ctx: &StageContext,
    ) -> StageOutcome {
        let value_reasons: Vec<Option<String>> = records
            .iter()
            .map(|r| check_values(r, ctx.filter.max_price))
            .collect();

        // Group candidate rows by full-row equality.
        let mut groups: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            groups.entry(record.row_key()).or_default().push(idx);
        }
        let has_duplicates = groups.values().any(|g| g.len() > 1);

        let mut admitted = Vec::with_capacity(records.len());
        let mut verdicts = Vec::with_capacity(records.len());

        if has_duplicates && ctx.filter.duplicate_policy == DuplicatePolicy::RejectAll {
            // Whole-set fail-fast: any duplicate rejects every record.
            for (idx, record) in records.into_iter().enumerate() {
                let reason = value_reasons[idx]
                    .clone()
                    .unwrap_or_else(|| "duplicate rows detected in batch".to_string());
                verdicts.push(Verdict::reject(record.id, self.name(), reason));
            }
            return StageOutcome { admitted, verdicts };
        }

        // Under KeepFirst/DropAllButFirst, map later occurrences to the
        // record id of the occurrence they duplicate.
        let mut duplicate_of: HashMap<usize, usize> = HashMap::new();
        if has_duplicates {
            for group in groups.values() {
                let first_id = records[group[0]].id;
                for &idx in &group[1..] {
                    duplicate_of.insert(idx, first_id);
                }
            }
        }

        for (idx, record) in records.into_iter().enumerate() {
            let reason = value_reasons[idx].clone().or_else(|| {
                duplicate_of
                    .get(&idx)
                    .map(|first| match ctx.filter.duplicate_policy {
                        DuplicatePolicy::DropAllButFirst => {
                            format!("dropped duplicate of record {first}")
                        }
                        _ => format!("duplicate of record {first}"),
                    })
            });
            match reason {
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

/// Per-record business checks, independent of the rest of the set.
fn check_values(record: &Record, max_price: f64) -> Option<String> {
    if let Some(price) = record.get("price") {
        match price.as_f64() {
            None => return Some("price is not a number".to_string()),
            Some(p) if p < 0.0 => return Some(format!("price {p} is negative")),
            Some(p) if p > max_price => {
                return Some(format!("price {p} exceeds maximum {max_price}"));
            }
            Some(_) => {}
        }
    }

    if let Some(quantity) = record.get("quantity") {
        match quantity.as_f64() {
            None => return Some("quantity is not a number".to_string()),
            Some(q) if q <= 0.0 => return Some(format!("quantity {q} must be positive")),
            Some(_) => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaInferencer;
    use crate::stage::{FilterConfig, Outcome};
    use indexmap::IndexMap;

    fn record(id: usize, pairs: Vec<(&str, Value)>) -> Record {
        let values: IndexMap<String, Value> =
            pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Record::new(id, values)
    }

    fn order(id: usize, price: i64, quantity: i64) -> Record {
        record(
            id,
            vec![
                ("price", Value::Integer(price)),
                ("quantity", Value::Integer(quantity)),
            ],
        )
    }

    fn apply(records: Vec<Record>, ctx: &StageContext) -> StageOutcome {
        let schema = SchemaInferencer::infer(&records, "orders.csv").unwrap();
        SemanticFilter.apply(records, &schema, ctx)
    }

    #[test]
    fn test_price_and_quantity_rules() {
        let ctx = StageContext::default();
        let outcome = apply(
            vec![
                order(0, 10, 5),
                order(1, -5, 3),
                order(2, 20_000, 1),
                order(3, 20, 0),
            ],
            &ctx,
        );
        let ids: Vec<usize> = outcome.admitted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0]);

        let reasons: Vec<&str> = outcome
            .verdicts
            .iter()
            .filter_map(|v| v.reason.as_deref())
            .collect();
        assert!(reasons.iter().any(|r| r.contains("negative")));
        assert!(reasons.iter().any(|r| r.contains("exceeds maximum")));
        assert!(reasons.iter().any(|r| r.contains("must be positive")));
    }

    #[test]
    fn test_unparsable_price_rejects() {
        let ctx = StageContext::default();
        let outcome = apply(
            vec![record(
                0,
                vec![
                    ("price", Value::Text("free".to_string())),
                    ("quantity", Value::Integer(1)),
                ],
            )],
            &ctx,
        );
        assert!(outcome.admitted.is_empty());
        assert_eq!(
            outcome.verdicts[0].reason.as_deref(),
            Some("price is not a number")
        );
    }

    #[test]
    fn test_columns_optional() {
        // Records without price/quantity columns pass the value checks.
        let ctx = StageContext::default();
        let outcome = apply(
            vec![record(0, vec![("name", Value::Text("widget".to_string()))])],
            &ctx,
        );
        assert_eq!(outcome.admitted.len(), 1);
    }

    #[test]
    fn test_reject_all_on_any_duplicate() {
        let ctx = StageContext::default();
        // Records 1 and 2 are identical; record 0 is clean but still rejected.
        let outcome = apply(vec![order(0, 10, 5), order(1, 20, 1), order(2, 20, 1)], &ctx);
        assert!(outcome.admitted.is_empty());
        assert_eq!(outcome.verdicts.len(), 3);
        assert!(
            outcome
                .verdicts
                .iter()
                .all(|v| v.outcome == Outcome::Reject)
        );
    }

    #[test]
    fn test_keep_first_policy() {
        let ctx = StageContext::new(FilterConfig {
            duplicate_policy: DuplicatePolicy::KeepFirst,
            ..Default::default()
        });
        let outcome = apply(vec![order(0, 10, 5), order(1, 20, 1), order(2, 20, 1)], &ctx);
        let ids: Vec<usize> = outcome.admitted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1]);
        let dup = outcome
            .verdicts
            .iter()
            .find(|v| v.record_id == 2)
            .unwrap();
        assert_eq!(dup.reason.as_deref(), Some("duplicate of record 1"));
    }

    #[test]
    fn test_drop_all_but_first_marks_rows_as_dropped() {
        let ctx = StageContext::new(FilterConfig {
            duplicate_policy: DuplicatePolicy::DropAllButFirst,
            ..Default::default()
        });
        let outcome = apply(vec![order(0, 10, 5), order(1, 20, 1), order(2, 20, 1)], &ctx);
        let ids: Vec<usize> = outcome.admitted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1]);
        let dup = outcome
            .verdicts
            .iter()
            .find(|v| v.record_id == 2)
            .unwrap();
        assert_eq!(dup.reason.as_deref(), Some("dropped duplicate of record 1"));
    }

    #[test]
    fn test_value_reason_wins_over_duplicate_reason() {
        let ctx = StageContext::default();
        // Two identical bad-price rows: rejected for the price, not the dup.
        let outcome = apply(vec![order(0, -1, 1), order(1, -1, 1)], &ctx);
        assert!(
            outcome
                .verdicts
                .iter()
                .all(|v| v.reason.as_deref().is_some_and(|r| r.contains("negative")))
        );
    }
}
