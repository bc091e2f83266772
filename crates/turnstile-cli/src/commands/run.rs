//! Run command - push one batch through the full admission pipeline.

use std::path::PathBuf;

use colored::Colorize;
use rusqlite::Connection;
use turnstile::{AdmissionPipeline, Outcome, PipelineConfig};

use crate::cli::DuplicateChoice;

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    predicted_admit: f64,
    predicted_reject: f64,
    db: PathBuf,
    max_price: Option<f64>,
    threshold: Option<f64>,
    duplicates: DuplicateChoice,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    if !(0.0..=1.0).contains(&predicted_admit) || !(0.0..=1.0).contains(&predicted_reject) {
        return Err("predicted rates must be in [0, 1]".into());
    }

    let mut config = PipelineConfig::default();
    if let Some(max_price) = max_price {
        config.filter.max_price = max_price;
    }
    if let Some(threshold) = threshold {
        config.divergence_threshold = threshold;
    }
    config.filter.duplicate_policy = duplicates.into();

    println!(
        "{} {}",
        "Admitting".cyan().bold(),
        file.display().to_string().white()
    );

    let mut conn = Connection::open(&db)?;
    let pipeline = AdmissionPipeline::with_config(config);
    let report = pipeline.run_file(&file, &mut conn, predicted_admit, predicted_reject)?;

    if verbose {
        println!();
        println!("{}", "Schema:".yellow().bold());
        for col in &report.schema.columns {
            println!("  {:20} {}", col.name, col.declared_type.sql_type());
        }
        println!();
        println!("{}", "Rejections:".yellow().bold());
        for verdict in &report.verdicts {
            if verdict.outcome == Outcome::Reject {
                println!(
                    "  record {:4} [{}] {}",
                    verdict.record_id,
                    verdict.stage,
                    verdict.reason.as_deref().unwrap_or("")
                );
            }
        }
        println!();
    }

    println!(
        "Admitted {} of {} records ({} rejected)",
        report.admission.admitted.to_string().green().bold(),
        report.admission.total.to_string().white().bold(),
        report.admission.rejected.to_string().red()
    );

    match (&report.load.error, report.load.rows_written) {
        (Some(error), _) => println!("{} {}", "Load failed:".red().bold(), error),
        (None, 0) => println!("{}", "Nothing to load".yellow()),
        (None, n) => println!(
            "Wrote {} rows to table '{}'",
            n.to_string().white().bold(),
            report.schema.table_id
        ),
    }

    let calibration = &report.calibration;
    if calibration.aligned {
        println!(
            "{} divergence {:.3} (empirical {:.2} vs predicted {:.2})",
            "Aligned:".green().bold(),
            calibration.divergence,
            calibration.empirical_admit_rate,
            calibration.predicted_admit_rate
        );
    } else {
        println!(
            "{} divergence {:.3} (empirical {:.2} vs predicted {:.2})",
            "Diverged:".red().bold(),
            calibration.divergence,
            calibration.empirical_admit_rate,
            calibration.predicted_admit_rate
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
