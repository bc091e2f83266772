//! Core type definitions for schema representation.

use serde::{Deserialize, Serialize};

use crate::record::Value;

/// Declared data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Real,
    /// Text/string values.
    Text,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Real)
    }

    /// SQL type name used when creating the destination table.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Uppercase label used when synthesizing column names.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Check a value against this declared type.
    ///
    /// An integer column requires an integral value; a real column accepts any
    /// numeric value; a text column requires a string. No coercion: a numeric
    /// string in a text column is fine, a string in a numeric column is not.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ColumnType::Integer, Value::Integer(_)) => true,
            (ColumnType::Real, Value::Integer(_) | Value::Real(_)) => true,
            (ColumnType::Text, Value::Text(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_no_coercion() {
        assert!(ColumnType::Integer.accepts(&Value::Integer(1)));
        assert!(!ColumnType::Integer.accepts(&Value::Real(1.0)));
        assert!(ColumnType::Real.accepts(&Value::Integer(1)));
        assert!(ColumnType::Real.accepts(&Value::Real(0.5)));
        assert!(!ColumnType::Real.accepts(&Value::Text("0.5".to_string())));
        assert!(ColumnType::Text.accepts(&Value::Text("x".to_string())));
        assert!(!ColumnType::Text.accepts(&Value::Integer(1)));
        assert!(!ColumnType::Text.accepts(&Value::Missing));
    }

    #[test]
    fn test_sql_type_names() {
        assert_eq!(ColumnType::Integer.sql_type(), "INTEGER");
        assert_eq!(ColumnType::Real.sql_type(), "REAL");
        assert_eq!(ColumnType::Text.sql_type(), "TEXT");
    }
}
