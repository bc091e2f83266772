//! Pipeline driver: schema inference, stage filters, bulk load, calibration.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::calibrate::{CalibrationReport, DEFAULT_DIVERGENCE_THRESHOLD, calibrate_admission};
use crate::error::Result;
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::loader::{BulkLoader, LoadResult};
use crate::record::Record;
use crate::schema::{SchemaInferencer, TableSchema};
use crate::stage::{AdmissionResult, FilterConfig, StageContext, Verdict, run_stages};

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Stage filter configuration.
    pub filter: FilterConfig,
    /// Calibration alignment threshold.
    pub divergence_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            filter: FilterConfig::default(),
            divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD,
        }
    }
}

/// Everything one batch run produced.
///
/// The verdict trace, admission summary, load outcome, and calibration report
/// all describe the same batch; nothing here outlives the run except the rows
/// the loader committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Source file metadata (present when the batch came from a file).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    /// Schema inferred for the batch.
    pub schema: TableSchema,
    /// Full per-record, per-stage verdict trace.
    pub verdicts: Vec<Verdict>,
    /// Admission summary over the whole batch.
    pub admission: AdmissionResult,
    /// Bulk load outcome for the final admitted set.
    pub load: LoadResult,
    /// Reconciliation against the externally predicted rates.
    pub calibration: CalibrationReport,
    /// When the run happened.
    pub ran_at: DateTime<Utc>,
}

/// The multi-stage data admission pipeline.
pub struct AdmissionPipeline {
    config: PipelineConfig,
    parser: Parser,
    loader: BulkLoader,
}

impl AdmissionPipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self {
            config,
            parser,
            loader: BulkLoader,
        }
    }

    /// Parse a CSV file and run the full pipeline against `conn`.
    ///
    /// The destination table is named after the file.
    pub fn run_file(
        &self,
        path: impl AsRef<Path>,
        conn: &mut Connection,
        predicted_admit_rate: f64,
        predicted_reject_rate: f64,
    ) -> Result<BatchReport> {
        let path = path.as_ref();
        let (records, source) = self.parser.parse_file(path)?;

        let mut report = self.run_batch(
            records,
            &path.to_string_lossy(),
            conn,
            predicted_admit_rate,
            predicted_reject_rate,
        )?;
        report.source = Some(source);
        Ok(report)
    }

    /// Run the full pipeline over an in-memory batch.
    ///
    /// Control flow: schema inference, then the fixed-order stage filters,
    /// then the bulk load of the final admitted set, then calibration over
    /// the full verdict trace. The calibrator always runs: a load failure is
    /// captured in the report rather than cutting the run short, since both
    /// consume the same trace independently. Schema problems (empty batch,
    /// unnamable source) abort with a typed error.
    pub fn run_batch(
        &self,
        records: Vec<Record>,
        source_name: &str,
        conn: &mut Connection,
        predicted_admit_rate: f64,
        predicted_reject_rate: f64,
    ) -> Result<BatchReport> {
        let schema = SchemaInferencer::infer(&records, source_name)?;
        let ctx = StageContext::new(self.config.filter.clone());

        let (admitted, verdicts) = run_stages(records, &schema, &ctx);

        let load = match self.loader.load(&admitted, &schema, conn) {
            Ok(result) => result,
            Err(e) => LoadResult::failed(e.to_string()),
        };

        let admission = AdmissionResult::from_verdicts(&verdicts);
        let calibration = calibrate_admission(
            &admission,
            predicted_admit_rate,
            predicted_reject_rate,
            self.config.divergence_threshold,
        );

        Ok(BatchReport {
            source: None,
            schema,
            verdicts,
            admission,
            load,
            calibration,
            ran_at: Utc::now(),
        })
    }
}

impl Default for AdmissionPipeline {
    fn default() -> Self {
        Self::new()
    }
}
