//! Schema types and per-batch schema inference.

mod infer;
mod table;
mod types;

pub use infer::SchemaInferencer;
pub use table::{ColumnSchema, TableSchema};
pub use types::ColumnType;
