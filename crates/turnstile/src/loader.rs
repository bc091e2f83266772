//! Bulk loader: persists the admitted set in one all-or-nothing transaction.

use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TurnstileError};
use crate::record::{Record, Value};
use crate::schema::TableSchema;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Missing => ToSqlOutput::Owned(rusqlite::types::Value::Null),
        })
    }
}

/// Outcome of one bulk load.
///
/// `succeeded == false` with `error == None` means there was nothing to do
/// (empty admitted set); callers branch on `rows_written` vs `error` to tell
/// the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    /// Whether rows were committed.
    pub succeeded: bool,
    /// Number of rows written (0 unless `succeeded`).
    pub rows_written: usize,
    /// Store error message, if the transaction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadResult {
    /// Nothing to load.
    pub fn empty() -> Self {
        Self {
            succeeded: false,
            rows_written: 0,
            error: None,
        }
    }

    /// A committed load of `rows_written` rows.
    pub fn committed(rows_written: usize) -> Self {
        Self {
            succeeded: true,
            rows_written,
            error: None,
        }
    }

    /// A rolled-back load with the store's error attached.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            rows_written: 0,
            error: Some(error.into()),
        }
    }
}

/// Persists admitted records into the destination table.
pub struct BulkLoader;

impl BulkLoader {
    /// Load `records` into the table described by `schema`.
    ///
    /// The destination table is created if absent, using the schema's columns
    /// and declared types verbatim; calling this on every batch is safe. All
    /// inserts happen inside a single transaction: any row failure rolls the
    /// whole batch back and surfaces as [`TurnstileError::Load`]. A half-applied
    /// table is never left behind.
    pub fn load(
        &self,
        records: &[Record],
        schema: &TableSchema,
        conn: &mut Connection,
    ) -> Result<LoadResult> {
        if records.is_empty() {
            return Ok(LoadResult::empty());
        }

        let table = schema.table_id.as_str();

        // The transaction rolls back on drop unless committed, so every early
        // return below leaves the store untouched.
        let tx = conn
            .transaction()
            .map_err(|e| load_err(table, e))?;

        tx.execute_batch(&create_table_sql(schema))
            .map_err(|e| load_err(table, e))?;

        {
            let mut stmt = tx
                .prepare(&insert_sql(schema))
                .map_err(|e| load_err(table, e))?;
            for record in records {
                stmt.execute(params_from_iter(record.iter_values()))
                    .map_err(|e| load_err(table, e))?;
            }
        }

        tx.commit().map_err(|e| load_err(table, e))?;

        Ok(LoadResult::committed(records.len()))
    }
}

fn load_err(table: &str, source: rusqlite::Error) -> TurnstileError {
    TurnstileError::Load {
        table: table.to_string(),
        source,
    }
}

/// Idempotent DDL for the destination table.
fn create_table_sql(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("\"{}\" {}", c.name, c.declared_type.sql_type()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" ({});",
        schema.table_id,
        columns.join(", ")
    )
}

/// Positional insert statement matching the schema's column order.
fn insert_sql(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect();
    let placeholders: Vec<String> = (1..=schema.column_count())
        .map(|i| format!("?{i}"))
        .collect();
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        schema.table_id,
        columns.join(", "),
        placeholders.join(", ")
    )
}
