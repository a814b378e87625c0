//! Table validation against canonical schemas
//!
//! Validation semantics:
//! - Table name matches
//! - Exactly the declared columns, in declared order
//! - Column types match exactly (no coercion)
//! - Non-nullable columns hold no nulls
//!
//! The validator never mutates tables and is deterministic.

use crate::storage::{ColumnData, Table};

use super::errors::{SchemaError, SchemaResult};
use super::types::TableSchema;

/// Validates stored tables against their canonical schema.
pub struct TableValidator;

impl TableValidator {
    /// Checks `table` against `schema`.
    pub fn validate(table: &Table, schema: &TableSchema) -> SchemaResult<()> {
        if table.name != schema.name {
            return Err(SchemaError::WrongTable {
                expected: schema.name.to_string(),
                found: table.name.clone(),
            });
        }

        for (index, def) in schema.columns.iter().enumerate() {
            let column = table
                .columns
                .get(index)
                .ok_or_else(|| SchemaError::missing_column(schema.name, def.name))?;

            if column.name != def.name {
                // Either out of order or a stranger in our slot
                return Err(match schema.column(&column.name) {
                    Some(_) => SchemaError::missing_column(schema.name, def.name),
                    None => SchemaError::UnexpectedColumn {
                        table: schema.name.to_string(),
                        column: column.name.clone(),
                    },
                });
            }

            let found = column.data.column_type();
            if found != def.column_type {
                return Err(SchemaError::TypeMismatch {
                    table: schema.name.to_string(),
                    column: def.name.to_string(),
                    expected: def.column_type,
                    found,
                });
            }

            if !def.nullable {
                if let Some(row) = first_null(&column.data) {
                    return Err(SchemaError::null_value(schema.name, def.name, row));
                }
            }
        }

        if let Some(extra) = table.columns.get(schema.columns.len()) {
            return Err(SchemaError::UnexpectedColumn {
                table: schema.name.to_string(),
                column: extra.name.clone(),
            });
        }

        Ok(())
    }
}

fn first_null(data: &ColumnData) -> Option<usize> {
    match data {
        ColumnData::Int64(v) | ColumnData::Timestamp(v) => v.iter().position(Option::is_none),
        ColumnData::Float64(v) => v.iter().position(Option::is_none),
        ColumnData::Utf8(v) => v.iter().position(Option::is_none),
    }
}
