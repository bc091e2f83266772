//! Admission calibrator: reconciles the empirical admission rate against an
//! externally supplied prediction.

use serde::{Deserialize, Serialize};

use crate::stage::{AdmissionResult, Verdict};

/// Default divergence threshold for the alignment verdict.
pub const DEFAULT_DIVERGENCE_THRESHOLD: f64 = 0.2;

/// Sentinel divergence reported for an empty batch: the L1 metric's upper
/// bound, so the report is unmistakably non-aligned without being an error.
pub const EMPTY_BATCH_DIVERGENCE: f64 = 2.0;

/// Comparison of empirical and predicted admission rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub empirical_admit_rate: f64,
    pub empirical_reject_rate: f64,
    pub predicted_admit_rate: f64,
    pub predicted_reject_rate: f64,
    /// L1 distance over the two-category distribution, in `0..=2`.
    pub divergence: f64,
    /// Whether the divergence is within the configured threshold.
    pub aligned: bool,
}

/// Reconcile a full verdict trace against predicted rates.
///
/// Aggregates the trace into an [`AdmissionResult`] first; callers that
/// already hold the summary can use [`calibrate_admission`] directly.
pub fn calibrate(
    verdicts: &[Verdict],
    predicted_admit_rate: f64,
    predicted_reject_rate: f64,
    divergence_threshold: f64,
) -> CalibrationReport {
    calibrate_admission(
        &AdmissionResult::from_verdicts(verdicts),
        predicted_admit_rate,
        predicted_reject_rate,
        divergence_threshold,
    )
}

/// Reconcile an admission summary against predicted rates.
///
/// Pure and deterministic; no retries. An empty batch is a valid degenerate
/// case: it yields a sentinel divergence and `aligned = false` rather than a
/// division error, so callers can log it and continue.
pub fn calibrate_admission(
    admission: &AdmissionResult,
    predicted_admit_rate: f64,
    predicted_reject_rate: f64,
    divergence_threshold: f64,
) -> CalibrationReport {
    if admission.total == 0 {
        return CalibrationReport {
            empirical_admit_rate: 0.0,
            empirical_reject_rate: 0.0,
            predicted_admit_rate,
            predicted_reject_rate,
            divergence: EMPTY_BATCH_DIVERGENCE,
            aligned: false,
        };
    }

    let empirical_admit_rate = admission.empirical_admit_rate;
    let empirical_reject_rate = 1.0 - empirical_admit_rate;

    let divergence = (empirical_admit_rate - predicted_admit_rate).abs()
        + (empirical_reject_rate - predicted_reject_rate).abs();

    CalibrationReport {
        empirical_admit_rate,
        empirical_reject_rate,
        predicted_admit_rate,
        predicted_reject_rate,
        divergence,
        aligned: divergence <= divergence_threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admission(total: usize, admitted: usize) -> AdmissionResult {
        AdmissionResult {
            total,
            admitted,
            rejected: total - admitted,
            empirical_admit_rate: if total == 0 {
                0.0
            } else {
                admitted as f64 / total as f64
            },
        }
    }

    #[test]
    fn test_divergence_is_l1_distance() {
        // empirical 0.6 vs predicted 0.85/0.15: |0.6-0.85| + |0.4-0.15| = 0.5
        let report =
            calibrate_admission(&admission(10, 6), 0.85, 0.15, DEFAULT_DIVERGENCE_THRESHOLD);
        assert!((report.divergence - 0.5).abs() < 1e-12);
        assert!(!report.aligned);
    }

    #[test]
    fn test_aligned_within_threshold() {
        let report =
            calibrate_admission(&admission(10, 8), 0.85, 0.15, DEFAULT_DIVERGENCE_THRESHOLD);
        assert!((report.divergence - 0.1).abs() < 1e-12);
        assert!(report.aligned);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let report =
            calibrate_admission(&admission(10, 5), 0.6, 0.4, DEFAULT_DIVERGENCE_THRESHOLD);
        assert!((report.divergence - 0.2).abs() < 1e-12);
        assert!(report.aligned);
    }

    #[test]
    fn test_empty_batch_sentinel() {
        let report =
            calibrate_admission(&admission(0, 0), 0.85, 0.15, DEFAULT_DIVERGENCE_THRESHOLD);
        assert_eq!(report.divergence, EMPTY_BATCH_DIVERGENCE);
        assert!(!report.aligned);
    }

    #[test]
    fn test_calibrate_aggregates_the_trace() {
        let verdicts = vec![
            Verdict::admit(0, "structural"),
            Verdict::admit(1, "structural"),
            Verdict::admit(0, "semantic"),
            Verdict::reject(1, "semantic", "negative price"),
        ];
        let report = calibrate(&verdicts, 0.5, 0.5, DEFAULT_DIVERGENCE_THRESHOLD);
        assert!((report.empirical_admit_rate - 0.5).abs() < 1e-12);
        assert!(report.aligned);
    }

    #[test]
    fn test_swapped_predictions_differ_except_at_indifference_point() {
        // At 0.6 empirical, swapping the predicted rates changes alignment.
        let a = calibrate_admission(&admission(10, 6), 0.6, 0.4, DEFAULT_DIVERGENCE_THRESHOLD);
        let b = calibrate_admission(&admission(10, 6), 0.4, 0.6, DEFAULT_DIVERGENCE_THRESHOLD);
        assert_ne!(a.aligned, b.aligned);

        // At the 0.5 indifference point the swap is symmetric.
        let c = calibrate_admission(&admission(10, 5), 0.7, 0.3, DEFAULT_DIVERGENCE_THRESHOLD);
        let d = calibrate_admission(&admission(10, 5), 0.3, 0.7, DEFAULT_DIVERGENCE_THRESHOLD);
        assert_eq!(c.divergence, d.divergence);
        assert_eq!(c.aligned, d.aligned);
    }
}
