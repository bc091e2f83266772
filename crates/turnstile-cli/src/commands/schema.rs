//! Schema command - infer and print a file's schema without loading.

use std::path::PathBuf;

use colored::Colorize;
use turnstile::{Parser, SchemaInferencer};

pub fn run(file: PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let parser = Parser::new();
    let (records, metadata) = parser.parse_file(&file)?;
    let schema = SchemaInferencer::infer(&records, &file.to_string_lossy())?;

    println!(
        "{} {} ({} rows, {} columns)",
        "Table".cyan().bold(),
        schema.table_id.white().bold(),
        metadata.row_count,
        metadata.column_count
    );
    for col in &schema.columns {
        println!("  {:3} {:20} {}", col.position, col.name, col.declared_type.sql_type());
    }

    if verbose {
        println!();
        println!("source hash: {}", metadata.hash);
    }

    Ok(())
}
