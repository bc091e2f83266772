//! Tagged scalar values and batch records.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single cell value with a typed discriminant.
///
/// Every structural check is an exhaustive match over this enum; no runtime
/// type probing happens anywhere downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Real(f64),
    /// Text value.
    Text(String),
    /// Explicit missing marker.
    Missing,
}

impl Value {
    /// Convert a raw CSV cell into a typed value.
    ///
    /// Null-like patterns become [`Value::Missing`]; otherwise the narrowest
    /// numeric parse wins, falling back to text.
    pub fn from_cell(cell: &str) -> Self {
        if Self::is_null_cell(cell) {
            return Value::Missing;
        }
        let trimmed = cell.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Real(f);
        }
        Value::Text(cell.to_string())
    }

    /// Check if a raw cell represents a missing/null value.
    pub fn is_null_cell(cell: &str) -> bool {
        let trimmed = cell.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }

    /// Returns true if this value is numeric (integer or real).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }

    /// Returns true if this value is the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Uppercase label of the value's runtime type, for verdict reasons.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Missing => "MISSING",
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(_) | Value::Missing => None,
        }
    }
}

// Full-row duplicate detection needs Eq + Hash; reals compare bitwise so the
// impls agree with each other (NaN == NaN here, which is what "the same row
// appeared twice" means).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Missing, Value::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Integer(i) => {
                state.write_u8(0);
                i.hash(state);
            }
            Value::Real(f) => {
                state.write_u8(1);
                f.to_bits().hash(state);
            }
            Value::Text(s) => {
                state.write_u8(2);
                s.hash(state);
            }
            Value::Missing => state.write_u8(3),
        }
    }
}

/// Placeholder name given to a header cell with no usable name.
///
/// The schema inferencer replaces placeholders with synthesized names built
/// from the column's inferred type and position.
pub fn anonymous_column(position: usize) -> String {
    format!("_anon_{position}")
}

/// Returns true if `name` is an anonymous placeholder.
pub fn is_anonymous_column(name: &str) -> bool {
    name.starts_with("_anon_")
}

/// One row of a batch: an ordered mapping from column name to value.
///
/// Records are immutable once ingested. The `id` is the zero-based position
/// of the row within its batch and ties the record to its verdicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Position of this record within the batch.
    pub id: usize,
    /// Column name to value, in column order.
    pub values: IndexMap<String, Value>,
}

impl Record {
    /// Create a record from ordered (name, value) pairs.
    pub fn new(id: usize, values: IndexMap<String, Value>) -> Self {
        Self { id, values }
    }

    /// Build a record from parallel header and cell slices.
    pub fn from_cells(id: usize, headers: &[String], cells: &[String]) -> Self {
        let values = headers
            .iter()
            .zip(cells)
            .map(|(h, c)| (h.clone(), Value::from_cell(c)))
            .collect();
        Self { id, values }
    }

    /// Number of values in this record.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the record has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Values in column order.
    pub fn iter_values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    /// Key used for full-row equality during duplicate detection.
    ///
    /// Only the values matter; two rows with identical content are duplicates
    /// regardless of their batch positions.
    pub fn row_key(&self) -> Vec<Value> {
        self.values.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cell_typing() {
        assert_eq!(Value::from_cell("42"), Value::Integer(42));
        assert_eq!(Value::from_cell("-7"), Value::Integer(-7));
        assert_eq!(Value::from_cell("3.25"), Value::Real(3.25));
        assert_eq!(Value::from_cell("hello"), Value::Text("hello".to_string()));
        assert_eq!(Value::from_cell(""), Value::Missing);
        assert_eq!(Value::from_cell("NA"), Value::Missing);
        assert_eq!(Value::from_cell("n/a"), Value::Missing);
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::Integer(5).as_f64(), Some(5.0));
        assert_eq!(Value::Real(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Text("5".to_string()).as_f64(), None);
        assert!(Value::Missing.is_missing());
        assert!(!Value::Missing.is_numeric());
    }

    #[test]
    fn test_row_key_ignores_position() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let cells = vec!["1".to_string(), "x".to_string()];
        let r1 = Record::from_cells(0, &headers, &cells);
        let r2 = Record::from_cells(9, &headers, &cells);
        assert_eq!(r1.row_key(), r2.row_key());
        assert_ne!(r1, r2); // ids differ
    }

    #[test]
    fn test_real_equality_is_bitwise() {
        assert_eq!(Value::Real(f64::NAN), Value::Real(f64::NAN));
        assert_ne!(Value::Real(1.0), Value::Integer(1));
    }
}
