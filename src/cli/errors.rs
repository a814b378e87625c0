//! CLI error types
//!
//! Wraps the library errors so every failure reaches stdout as one error
//! envelope carrying the underlying stable code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::executor::{ExecutionCause, QueryError, UnknownQuery};
use crate::ingest::IngestError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Io(String),

    #[error(transparent)]
    UnknownQuery(#[from] UnknownQuery),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Cannot inspect store at {}: {source}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: ExecutionCause,
    },
}

impl CliError {
    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        CliError::Io(msg.into())
    }

    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "TRIPDB_CLI_CONFIG_ERROR",
            CliError::Io(_) => "TRIPDB_CLI_IO_ERROR",
            CliError::UnknownQuery(_) => "TRIPDB_UNKNOWN_QUERY",
            CliError::Ingest(e) => e.code(),
            CliError::Query(e) => e.code(),
            CliError::Inspect { source, .. } => match source {
                _ if source.is_store_missing() => "TRIPDB_STORE_UNAVAILABLE",
                ExecutionCause::Storage(e) => e.code().code(),
                ExecutionCause::Schema(e) => e.code(),
            },
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_codes_pass_through() {
        let err: CliError = IngestError::NoSources.into();
        assert_eq!(err.code(), "TRIPDB_NO_SOURCES");

        let err: CliError = QueryError::StoreUnavailable {
            path: "db/taxi.tripdb".into(),
        }
        .into();
        assert_eq!(err.code(), "TRIPDB_STORE_UNAVAILABLE");

        let err: CliError = "fares".parse::<crate::executor::QueryKind>().unwrap_err().into();
        assert_eq!(err.code(), "TRIPDB_UNKNOWN_QUERY");
    }

    #[test]
    fn test_inspect_missing_store() {
        let path = Path::new("db/taxi.tripdb");
        let err = CliError::Inspect {
            path: path.to_path_buf(),
            source: crate::storage::StorageError::not_found(path).into(),
        };
        assert_eq!(err.code(), "TRIPDB_STORE_UNAVAILABLE");
    }
}
