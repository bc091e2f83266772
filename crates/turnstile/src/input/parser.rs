//! CSV parser producing typed batch records.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, TurnstileError};
use crate::record::{Record, Value, anonymous_column, is_anonymous_column};

use super::source::SourceMetadata;

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses tabular data files into batches of typed records.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the batch and its metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Vec<Record>, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| TurnstileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| TurnstileError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let records = self.parse_bytes(&contents)?;
        let column_count = records.first().map(|r| r.len()).unwrap_or(0);

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            records.len(),
            column_count,
        );

        Ok((records, metadata))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = if self.config.has_header {
            let raw = reader.headers()?.clone();
            resolve_headers(raw.iter())?
        } else {
            // Headerless input: every column is an anonymous placeholder for
            // the schema inferencer to name.
            match reader.records().next() {
                Some(Ok(first)) => {
                    let headers: Vec<String> = (0..first.len()).map(anonymous_column).collect();
                    // The reader consumed the first record; re-read from scratch.
                    return self.parse_rows(bytes, headers);
                }
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(TurnstileError::EmptyBatch("no data rows found".to_string()));
                }
            }
        };

        if headers.is_empty() {
            return Err(TurnstileError::EmptyBatch("no columns found".to_string()));
        }

        self.parse_rows(bytes, headers)
    }

    fn parse_rows(&self, bytes: &[u8], headers: Vec<String>) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let expected_cols = headers.len();
        let mut records = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let raw = result?;
            let mut cells: Vec<String> = raw.iter().map(|s| s.to_string()).collect();

            // Pad short rows with missing markers, truncate long ones, so the
            // record shape always matches the header.
            while cells.len() < expected_cols {
                cells.push(String::new());
            }
            cells.truncate(expected_cols);

            records.push(Record::from_cells(row_idx, &headers, &cells));
        }

        if records.is_empty() {
            return Err(TurnstileError::EmptyBatch("no data rows found".to_string()));
        }

        Ok(records)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn raw header cells into unique column names.
///
/// Null-like header cells become anonymous placeholders; duplicate explicit
/// names violate the schema's uniqueness invariant and fail early. The
/// placeholder prefix is reserved: an explicit header using it would be
/// indistinguishable from a nameless column and get silently renamed.
fn resolve_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Result<Vec<String>> {
    let mut headers = Vec::new();
    for (position, cell) in raw.enumerate() {
        let name = if Value::is_null_cell(cell) {
            anonymous_column(position)
        } else {
            let name = cell.trim().to_string();
            if is_anonymous_column(&name) {
                return Err(TurnstileError::Schema(format!(
                    "column name '{name}' uses the reserved placeholder prefix"
                )));
            }
            name
        };
        if headers.contains(&name) {
            return Err(TurnstileError::Schema(format!(
                "duplicate column name '{name}' in header"
            )));
        }
        headers.push(name);
    }
    Ok(headers)
}
