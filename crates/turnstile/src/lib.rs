//! Turnstile: a multi-stage data admission pipeline for tabular batches.
//!
//! Given a batch of records, Turnstile infers a target schema, runs each
//! record through successive structural and semantic filters, admits the
//! survivors into a relational store in one all-or-nothing transaction, and
//! reconciles the empirical admission rate against an externally supplied
//! prediction.
//!
//! # Core Principles
//!
//! - **Verdicts, not exceptions**: per-record problems become reject verdicts
//!   with reasons; only batch-level problems abort.
//! - **All or nothing**: the bulk load either commits every admitted row or
//!   leaves the store untouched.
//! - **Calibration is independent**: the alignment verdict is computed from
//!   the verdict trace whether or not the load succeeded.
//!
//! # Example
//!
//! ```no_run
//! use rusqlite::Connection;
//! use turnstile::AdmissionPipeline;
//!
//! let mut conn = Connection::open("pipeline.db").unwrap();
//! let pipeline = AdmissionPipeline::new();
//! let report = pipeline.run_file("orders.csv", &mut conn, 0.85, 0.15).unwrap();
//!
//! println!("admitted {}/{}", report.admission.admitted, report.admission.total);
//! println!("aligned: {}", report.calibration.aligned);
//! ```

pub mod calibrate;
pub mod error;
pub mod input;
pub mod loader;
pub mod record;
pub mod schema;
pub mod stage;

mod pipeline;

pub use crate::pipeline::{AdmissionPipeline, BatchReport, PipelineConfig};
pub use calibrate::{
    CalibrationReport, DEFAULT_DIVERGENCE_THRESHOLD, calibrate, calibrate_admission,
};
pub use error::{Result, TurnstileError};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use loader::{BulkLoader, LoadResult};
pub use record::{Record, Value};
pub use schema::{ColumnSchema, ColumnType, SchemaInferencer, TableSchema};
pub use stage::{
    AdmissionResult, DuplicatePolicy, FilterConfig, Outcome, SemanticFilter, StageContext,
    StageFilter, StageOutcome, StructuralFilter, Verdict, run_stages,
};
