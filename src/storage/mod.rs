//! Single-file columnar store
//!
//! The store holds the canonical persistent state of every table. It is
//! replaced as a whole and never modified in place.
//!
//! # Design Principles
//!
//! - One file, one header, one checksummed segment per table
//! - Whole-file atomic replace (temp file, fsync, rename)
//! - Checksum-verified on every read
//! - Corruption is reported, never skipped

mod checksum;
mod column;
mod errors;
mod reader;
mod segment;
mod writer;

pub use checksum::compute_checksum;
pub use column::{Column, ColumnData, ColumnType, Table};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::StoreReader;
pub use segment::{StoreHeader, FORMAT_VERSION, MAGIC};
pub use writer::StoreWriter;
