//! Ingestion error types
//!
//! Error codes:
//! - TRIPDB_NO_SOURCES
//! - TRIPDB_SOURCE_NOT_FOUND
//! - TRIPDB_SCHEMA_MISMATCH
//! - TRIPDB_SOURCE_UNREADABLE
//! - TRIPDB_STORAGE_WRITE_ERROR
//!
//! Every ingestion error aborts the whole run; the previous store is left as
//! it was.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::schema::SchemaError;
use crate::storage::{Severity, StorageError};

/// Result type for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No source files given")]
    NoSources,

    #[error("Source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Schema mismatch in {}: {source}", path.display())]
    SchemaMismatch {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("Unreadable source {}: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Failed to persist store: {0}")]
    StorageWriteError(#[from] StorageError),
}

impl IngestError {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::NoSources => "TRIPDB_NO_SOURCES",
            IngestError::SourceNotFound { .. } => "TRIPDB_SOURCE_NOT_FOUND",
            IngestError::SchemaMismatch { .. } => "TRIPDB_SCHEMA_MISMATCH",
            IngestError::SourceUnreadable { .. } => "TRIPDB_SOURCE_UNREADABLE",
            IngestError::StorageWriteError(_) => "TRIPDB_STORAGE_WRITE_ERROR",
        }
    }

    /// Ingestion failures never damage the committed store
    pub fn severity(&self) -> Severity {
        Severity::Error
    }

    pub(crate) fn not_found(path: &Path) -> Self {
        IngestError::SourceNotFound {
            path: path.to_path_buf(),
        }
    }

    pub(crate) fn schema(path: &Path, source: SchemaError) -> Self {
        IngestError::SchemaMismatch {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn unreadable(path: &Path, reason: impl ToString) -> Self {
        IngestError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
