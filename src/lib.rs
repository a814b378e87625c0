//! tripdb - deterministic ingestion and analytics for taxi trip records
//!
//! Monthly trip files and a zone lookup are ingested into a single
//! checksummed store file; a closed set of analytical queries runs against
//! it and returns ordered tabular results.

pub mod cli;
pub mod executor;
pub mod ingest;
pub mod observability;
pub mod schema;
pub mod storage;
