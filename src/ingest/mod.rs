//! Ingestion of trip sources into the store
//!
//! Reads monthly parquet trip files and the zone lookup CSV, reconciles them
//! with the canonical schemas, and replaces the store's `trips` and
//! `zone_lookup` tables in one atomic step.
//!
//! # Design Principles
//!
//! - All-or-nothing: a failed run leaves the previous store untouched
//! - Re-ingesting the same inputs yields identical tables
//! - Malformed inputs are rejected with the offending file named, never
//!   silently coerced

mod discovery;
mod errors;
mod ingestor;
mod lookup;
mod source;

pub use discovery::resolve_sources;
pub use errors::{IngestError, IngestResult};
pub use ingestor::{IngestOptions, IngestReport, Ingestor, SourceSummary};
pub use lookup::read_zone_lookup;
pub use source::{read_trip_source, SourceBatch};
