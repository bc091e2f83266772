//! Table-level schema definition.

use serde::{Deserialize, Serialize};

use super::types::ColumnType;

/// Schema for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Zero-based position in the table.
    pub position: usize,
    /// Declared data type.
    pub declared_type: ColumnType,
}

impl ColumnSchema {
    /// Create a new column schema.
    pub fn new(name: impl Into<String>, position: usize, declared_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            position,
            declared_type,
        }
    }
}

/// Schema for an entire table, derived once per batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Destination table identifier, derived from the source name.
    pub table_id: String,
    /// Schemas for each column, in column order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Create a table schema with the given identifier and columns.
    pub fn new(table_id: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            table_id: table_id.into(),
            columns,
        }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lookup() {
        let schema = TableSchema::new(
            "orders",
            vec![
                ColumnSchema::new("price", 0, ColumnType::Real),
                ColumnSchema::new("quantity", 1, ColumnType::Integer),
            ],
        );
        assert_eq!(schema.column_count(), 2);
        assert_eq!(schema.column_names(), vec!["price", "quantity"]);
        assert_eq!(
            schema.get_column("quantity").map(|c| c.declared_type),
            Some(ColumnType::Integer)
        );
        assert!(schema.get_column("missing").is_none());
    }
}
