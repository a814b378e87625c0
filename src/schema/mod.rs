//! Canonical schemas for the `trips` and `zone_lookup` tables
//!
//! Ingestion reconciles source files against these schemas; the executor
//! trusts nothing it reads from the store until it validates against them.
//!
//! # Design Principles
//!
//! - Fixed column order and exact types per table
//! - Derived columns are computed, never read from input
//! - Zone ids are unique
//! - Validation is deterministic and never mutates tables

mod errors;
mod trips;
mod types;
mod validator;
mod zones;

pub use errors::{SchemaError, SchemaResult};
pub use trips::{
    from_micros, to_micros, trip_duration_minutes, trips_from_table, trips_to_table, TripRecord,
};
pub use types::{
    trip_columns, zone_columns, ColumnDef, SourceColumn, TableSchema, LOOKUP_HEADER,
    TRIPS_SCHEMA, TRIPS_TABLE, TRIP_SOURCE_COLUMNS, ZONE_LOOKUP_SCHEMA, ZONE_LOOKUP_TABLE,
};
pub use validator::TableValidator;
pub use zones::{zones_from_table, zones_to_table, ServiceArea, ZoneDirectory, ZoneRecord};
