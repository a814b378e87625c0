//! Observability error types
//!
//! Error codes:
//! - TRIPDB_LOGGING_INIT_FAILED (ERROR severity)

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

use crate::storage::Severity;

/// Failure to install the log subscriber
#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Failed to install log subscriber: {0}")]
    SubscriberInit(#[from] TryInitError),
}

impl ObservabilityError {
    pub fn code(&self) -> &'static str {
        match self {
            ObservabilityError::SubscriberInit(_) => "TRIPDB_LOGGING_INIT_FAILED",
        }
    }

    /// Logging failures never affect results
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}
