//! Read-side handle on a store file
//!
//! A `Store` is only a path. Every `connect` opens the file, verifies every
//! segment checksum and both table schemas, decodes, and closes the file
//! again before returning.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::observability::Event;
use crate::schema::{
    trips_from_table, zones_from_table, TripRecord, ZoneDirectory, TRIPS_TABLE, ZONE_LOOKUP_TABLE,
};
use crate::storage::{StorageError, StoreReader, Table};

use super::errors::ExecutionCause;

/// Handle on a store location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    path: PathBuf,
}

/// Decoded store contents
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub trips: Vec<TripRecord>,
    pub zones: ZoneDirectory,
}

/// Shape of one stored table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: u64,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a store file exists at this location
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Reads and validates both tables.
    pub fn connect(&self) -> Result<StoreSnapshot, ExecutionCause> {
        let (trips, zones) = self.read_tables()?;
        let snapshot = StoreSnapshot {
            trips: trips_from_table(&trips)?,
            zones: zones_from_table(&zones)?,
        };
        debug!(
            event = %Event::StoreOpened,
            path = %self.path.display(),
            trips = snapshot.trips.len() as u64,
            zones = snapshot.zones.len() as u64,
        );
        Ok(snapshot)
    }

    /// Describes the stored tables without decoding records.
    pub fn inspect(&self) -> Result<Vec<TableSummary>, ExecutionCause> {
        let (trips, zones) = self.read_tables()?;
        Ok([trips, zones]
            .iter()
            .map(|table| TableSummary {
                name: table.name.clone(),
                rows: table.row_count() as u64,
                columns: table
                    .columns
                    .iter()
                    .map(|c| ColumnSummary {
                        name: c.name.clone(),
                        column_type: c.data.column_type().to_string(),
                    })
                    .collect(),
            })
            .collect())
    }

    fn read_tables(&self) -> Result<(Table, Table), StorageError> {
        let mut reader = StoreReader::open(&self.path)?;
        let mut tables = reader.read_all()?.into_iter();
        drop(reader);

        let mut next = |expected: &str| -> Result<Table, StorageError> {
            match tables.next() {
                Some(table) if table.name == expected => Ok(table),
                Some(table) => Err(StorageError::corruption_in_table(
                    &table.name,
                    format!("expected table '{}' at this position", expected),
                )),
                None => Err(StorageError::corruption_in_table(expected, "table missing from store")),
            }
        };
        let trips = next(TRIPS_TABLE)?;
        let zones = next(ZONE_LOOKUP_TABLE)?;
        if let Some(extra) = tables.next() {
            return Err(StorageError::corruption_in_table(&extra.name, "unexpected table in store"));
        }

        Ok((trips, zones))
    }
}
