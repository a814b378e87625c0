//! Observability for tripdb
//!
//! Structured logging through `tracing`. Every line carries an `event`
//! field drawn from [`Event`] or an [`ObservationScope`] name.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on results
//! 3. Library code only emits; the binary installs the subscriber

mod errors;
mod events;
mod scope;

pub use errors::ObservabilityError;
pub use events::Event;
pub use scope::ObservationScope;

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the JSON subscriber on stderr.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Installing twice is a
/// no-op apart from the returned error.
pub fn init_logging() -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .json()
        .with_writer(std::io::stderr)
        .finish()
        .try_init()?;
    Ok(())
}
