//! Schema error types
//!
//! Every variant maps to the single code `TRIPDB_SCHEMA_MISMATCH`: a table or
//! source file whose shape cannot be reconciled with the canonical schema.

use thiserror::Error;

use crate::storage::ColumnType;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema reconciliation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Expected table '{expected}', found '{found}'")]
    WrongTable { expected: String, found: String },

    #[error("Missing required column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Unexpected column '{column}' in {table}")]
    UnexpectedColumn { table: String, column: String },

    #[error("Column '{column}' in {table} has type {found}, expected {expected}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("Column '{column}' in {table} has type {found}, which cannot be read as {expected}")]
    UnsupportedSourceType {
        table: String,
        column: String,
        expected: ColumnType,
        found: String,
    },

    #[error("Null value in non-nullable column '{column}' of {table} at row {row}")]
    NullValue {
        table: String,
        column: String,
        row: usize,
    },

    #[error("Header mismatch in {table}: expected {expected}, found {found}")]
    HeaderMismatch {
        table: String,
        expected: String,
        found: String,
    },

    #[error("Duplicate zone id {zone_id} in {table}")]
    DuplicateZone { table: String, zone_id: i64 },
}

impl SchemaError {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        "TRIPDB_SCHEMA_MISMATCH"
    }

    pub(crate) fn missing_column(table: &str, column: &str) -> Self {
        SchemaError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub(crate) fn null_value(table: &str, column: &str, row: usize) -> Self {
        SchemaError::NullValue {
            table: table.to_string(),
            column: column.to_string(),
            row,
        }
    }
}
