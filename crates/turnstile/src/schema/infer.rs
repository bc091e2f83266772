//! Per-batch schema inference.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TurnstileError};
use crate::record::{Record, Value, is_anonymous_column};

use super::table::{ColumnSchema, TableSchema};
use super::types::ColumnType;

/// Safe SQL identifier shape for derived table ids.
static IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

/// Derives a table schema from one batch of records.
pub struct SchemaInferencer;

impl SchemaInferencer {
    /// Infer a schema for `batch`, naming the table after `source_name`.
    ///
    /// Column names come from the first record; anonymous placeholders are
    /// synthesized from the column's inferred type plus its position
    /// (`INTEGER_0`). Type inference examines every value in the column
    /// across the whole batch in a single pass.
    pub fn infer(batch: &[Record], source_name: &str) -> Result<TableSchema> {
        if batch.is_empty() {
            return Err(TurnstileError::EmptyBatch(
                "no records to infer a schema from".to_string(),
            ));
        }

        let table_id = derive_table_id(source_name)?;

        let first = &batch[0];
        let width = first.len();
        let types: Vec<ColumnType> = (0..width).map(|pos| infer_column_type(batch, pos)).collect();

        let mut seen: HashSet<String> = HashSet::new();
        let mut columns = Vec::with_capacity(width);

        for (pos, name) in first.values.keys().enumerate() {
            let declared_type = types[pos];

            let resolved = if is_anonymous_column(name) {
                // Positional suffix makes these unique; only an explicit
                // column with the same name forces further suffixing.
                let mut candidate = format!("{}_{}", declared_type.label(), pos);
                let mut n = 1;
                while seen.contains(&candidate) {
                    candidate = format!("{}_{}_{}", declared_type.label(), pos, n);
                    n += 1;
                }
                candidate
            } else {
                if seen.contains(name.as_str()) {
                    return Err(TurnstileError::Schema(format!(
                        "duplicate column name '{name}'"
                    )));
                }
                name.clone()
            };

            seen.insert(resolved.clone());
            columns.push(ColumnSchema::new(resolved, pos, declared_type));
        }

        Ok(TableSchema::new(table_id, columns))
    }
}

/// Infer the declared type for one column position.
///
/// INTEGER if every non-missing value is integral, REAL if every non-missing
/// value is numeric and at least one is non-integral, TEXT otherwise. A
/// column of all-missing values defaults to TEXT.
fn infer_column_type(batch: &[Record], position: usize) -> ColumnType {
    let mut saw_numeric = false;
    let mut saw_real = false;

    for record in batch {
        match record.values.get_index(position).map(|(_, v)| v) {
            Some(Value::Integer(_)) => saw_numeric = true,
            Some(Value::Real(_)) => {
                saw_numeric = true;
                saw_real = true;
            }
            Some(Value::Text(_)) => return ColumnType::Text,
            Some(Value::Missing) | None => {}
        }
    }

    if !saw_numeric {
        ColumnType::Text
    } else if saw_real {
        ColumnType::Real
    } else {
        ColumnType::Integer
    }
}

/// Derive a safe table identifier from a source name.
///
/// Strips any directory and extension, lowercases, collapses runs of
/// non-alphanumeric characters to underscores, and prefixes identifiers that
/// would start with a digit. An empty result is a caller error.
pub fn derive_table_id(source_name: &str) -> Result<String> {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut id = String::new();
    let mut pending_sep = false;
    for ch in stem.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !id.is_empty() {
                id.push('_');
            }
            id.push(ch);
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }

    if id.is_empty() {
        return Err(TurnstileError::Schema(format!(
            "source name '{source_name}' yields no usable table identifier"
        )));
    }

    let id = if id.starts_with(|c: char| c.is_ascii_digit()) {
        format!("t_{id}")
    } else {
        id
    };

    if !IDENT_RE.is_match(&id) {
        return Err(TurnstileError::Schema(format!(
            "derived table identifier '{id}' is not a safe identifier"
        )));
    }

    Ok(id)
}
