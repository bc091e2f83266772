//! Per-record, per-stage verdicts and the batch-level admission summary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Outcome of one stage for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Admit,
    Reject,
}

/// The outcome of one (record, stage) pair, with a reason on rejection.
///
/// Verdicts are append-only: each stage produces one per record it evaluates,
/// and the calibrator consumes the full trace at the end of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Position of the record within the batch.
    pub record_id: usize,
    /// Name of the stage that produced this verdict.
    pub stage: String,
    /// Admit or reject.
    pub outcome: Outcome,
    /// Why the record was rejected, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    /// Create an admitting verdict.
    pub fn admit(record_id: usize, stage: &str) -> Self {
        Self {
            record_id,
            stage: stage.to_string(),
            outcome: Outcome::Admit,
            reason: None,
        }
    }

    /// Create a rejecting verdict with a reason.
    pub fn reject(record_id: usize, stage: &str, reason: impl Into<String>) -> Self {
        Self {
            record_id,
            stage: stage.to_string(),
            outcome: Outcome::Reject,
            reason: Some(reason.into()),
        }
    }
}

/// Statistical summary of one batch's admission outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionResult {
    /// Number of records in the original batch.
    pub total: usize,
    /// Records that survived every stage.
    pub admitted: usize,
    /// Records rejected by at least one stage.
    pub rejected: usize,
    /// `admitted / total`, or 0.0 for an empty batch.
    pub empirical_admit_rate: f64,
}

impl AdmissionResult {
    /// Aggregate a verdict trace into an admission summary.
    ///
    /// A record's overall outcome is reject if any stage rejected it, admit
    /// otherwise.
    pub fn from_verdicts(verdicts: &[Verdict]) -> Self {
        let mut all: HashSet<usize> = HashSet::new();
        let mut rejected_ids: HashSet<usize> = HashSet::new();

        for verdict in verdicts {
            all.insert(verdict.record_id);
            if verdict.outcome == Outcome::Reject {
                rejected_ids.insert(verdict.record_id);
            }
        }

        let total = all.len();
        let rejected = rejected_ids.len();
        let admitted = total - rejected;
        let empirical_admit_rate = if total == 0 {
            0.0
        } else {
            admitted as f64 / total as f64
        };

        Self {
            total,
            admitted,
            rejected,
            empirical_admit_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_outcome_is_reject_if_any_stage_rejects() {
        let verdicts = vec![
            Verdict::admit(0, "structural"),
            Verdict::admit(1, "structural"),
            Verdict::admit(0, "semantic"),
            Verdict::reject(1, "semantic", "negative price"),
        ];
        let result = AdmissionResult::from_verdicts(&verdicts);
        assert_eq!(result.total, 2);
        assert_eq!(result.admitted, 1);
        assert_eq!(result.rejected, 1);
        assert!((result.empirical_admit_rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_conservation() {
        let verdicts = vec![
            Verdict::reject(0, "structural", "missing value"),
            Verdict::admit(1, "structural"),
            Verdict::admit(2, "structural"),
            Verdict::admit(1, "semantic"),
            Verdict::admit(2, "semantic"),
        ];
        let result = AdmissionResult::from_verdicts(&verdicts);
        assert_eq!(result.admitted + result.rejected, result.total);
    }

    #[test]
    fn test_empty_trace() {
        let result = AdmissionResult::from_verdicts(&[]);
        assert_eq!(result.total, 0);
        assert_eq!(result.empirical_admit_rate, 0.0);
    }
}
