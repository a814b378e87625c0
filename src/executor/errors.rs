//! Executor error types
//!
//! Error codes:
//! - TRIPDB_STORE_UNAVAILABLE (ERROR)
//! - TRIPDB_QUERY_EXECUTION_ERROR (ERROR, FATAL when the store is corrupt)

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaError;
use crate::storage::{Severity, StorageError};

use super::registry::QueryKind;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, QueryError>;

/// Why a store could not be read
#[derive(Debug, Error)]
pub enum ExecutionCause {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ExecutionCause {
    /// The store file does not exist
    pub fn is_store_missing(&self) -> bool {
        matches!(self, ExecutionCause::Storage(e) if e.is_not_found())
    }

    pub fn severity(&self) -> Severity {
        match self {
            ExecutionCause::Storage(e) => e.severity(),
            ExecutionCause::Schema(_) => Severity::Fatal,
        }
    }
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Store unavailable at {}: run ingestion first", path.display())]
    StoreUnavailable { path: PathBuf },

    #[error("Query '{query}' failed: {source}")]
    QueryExecutionError {
        query: QueryKind,
        #[source]
        source: ExecutionCause,
    },
}

impl QueryError {
    pub(crate) fn from_cause(query: QueryKind, path: PathBuf, cause: ExecutionCause) -> Self {
        if cause.is_store_missing() {
            QueryError::StoreUnavailable { path }
        } else {
            QueryError::QueryExecutionError {
                query,
                source: cause,
            }
        }
    }

    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::StoreUnavailable { .. } => "TRIPDB_STORE_UNAVAILABLE",
            QueryError::QueryExecutionError { .. } => "TRIPDB_QUERY_EXECUTION_ERROR",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            QueryError::StoreUnavailable { .. } => Severity::Error,
            QueryError::QueryExecutionError { source, .. } => source.severity(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
