//! Ingestion orchestration
//!
//! Ingestion order:
//! 1. Resolve and check every source path and the lookup path
//! 2. Decode every source file, applying the year filter
//! 3. Decode the zone lookup
//! 4. Replace the store atomically with both tables
//!
//! Nothing touches the store until every input decoded cleanly, so any
//! failure leaves the previous store exactly as it was.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::observability::{Event, ObservationScope};
use crate::schema::{trips_to_table, zones_to_table, TripRecord};
use crate::storage::StoreWriter;

use super::discovery::resolve_sources;
use super::errors::{IngestError, IngestResult};
use super::lookup::read_zone_lookup;
use super::source::read_trip_source;

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestOptions {
    /// Calendar year trips must be picked up in; `None` keeps every row
    pub analysis_year: Option<i32>,
}

impl IngestOptions {
    pub fn for_year(year: i32) -> Self {
        Self {
            analysis_year: Some(year),
        }
    }
}

/// Per-file ingestion counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub rows_read: u64,
    pub rows_kept: u64,
}

/// Outcome of a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub store_path: PathBuf,
    pub analysis_year: Option<i32>,
    pub sources: Vec<SourceSummary>,
    pub rows_read: u64,
    pub rows_outside_period: u64,
    pub trips_stored: u64,
    pub zones_stored: u64,
    pub store_bytes: u64,
}

/// Builds a store from trip sources and a zone lookup.
pub struct Ingestor {
    writer: StoreWriter,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(store_path: impl Into<PathBuf>, options: IngestOptions) -> Self {
        Self {
            writer: StoreWriter::new(store_path),
            options,
        }
    }

    pub fn store_path(&self) -> &Path {
        self.writer.path()
    }

    /// Reads every source and the lookup, then replaces the store.
    ///
    /// # Errors
    ///
    /// - `NoSources` when `source_paths` is empty
    /// - `SourceNotFound` for a missing source or lookup path
    /// - `SchemaMismatch` when a file cannot be reconciled
    /// - `SourceUnreadable` when a file is not valid parquet or CSV
    /// - `StorageWriteError` when the store cannot be replaced
    pub fn ingest(&self, source_paths: &[PathBuf], lookup_path: &Path) -> IngestResult<IngestReport> {
        let scope = ObservationScope::new("INGEST", self.store_path().display().to_string());
        match self.run(source_paths, lookup_path) {
            Ok(report) => {
                scope.complete(&format!(
                    "trips={} zones={} bytes={}",
                    report.trips_stored, report.zones_stored, report.store_bytes
                ));
                Ok(report)
            }
            Err(e) => {
                scope.fail(&e);
                Err(e)
            }
        }
    }

    fn run(&self, source_paths: &[PathBuf], lookup_path: &Path) -> IngestResult<IngestReport> {
        let files = resolve_sources(source_paths)?;
        if !lookup_path.is_file() {
            return Err(IngestError::not_found(lookup_path));
        }

        let year = self.options.analysis_year;
        let mut trips: Vec<TripRecord> = Vec::new();
        let mut sources = Vec::with_capacity(files.len());
        let mut rows_read = 0u64;
        let mut rows_outside_period = 0u64;

        for file in &files {
            let batch = read_trip_source(file, year)?;
            let kept = batch.records.len() as u64;
            info!(
                event = %Event::SourceRead,
                path = %file.display(),
                rows_read = batch.rows_read,
                rows_kept = kept,
            );

            rows_read += batch.rows_read;
            rows_outside_period += batch.rows_outside_period;
            sources.push(SourceSummary {
                path: file.clone(),
                rows_read: batch.rows_read,
                rows_kept: kept,
            });
            trips.extend(batch.records);
        }

        if rows_outside_period > 0 {
            info!(
                event = %Event::RowsOutsidePeriod,
                rows = rows_outside_period,
                year = ?year,
            );
        }

        let zones = read_zone_lookup(lookup_path)?;
        info!(
            event = %Event::LookupLoaded,
            path = %lookup_path.display(),
            zones = zones.len() as u64,
        );

        let tables = [trips_to_table(&trips), zones_to_table(&zones)];
        let store_bytes = self.writer.replace(&tables)?;
        info!(
            event = %Event::StoreReplaced,
            path = %self.store_path().display(),
            bytes = store_bytes,
        );

        Ok(IngestReport {
            store_path: self.store_path().to_path_buf(),
            analysis_year: year,
            sources,
            rows_read,
            rows_outside_period,
            trips_stored: trips.len() as u64,
            zones_stored: zones.len() as u64,
            store_bytes,
        })
    }
}
