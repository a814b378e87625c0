//! ObservationScope for automatic start/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` on `complete()`
//! - Logs `{name}_FAILED` on `fail()`
//! - Logs `{name}_INCOMPLETE` if dropped without either

use std::fmt::Display;
use std::time::Instant;

use tracing::{error, info, warn};

/// A scope that automatically logs start and completion
///
/// # Usage
///
/// ```ignore
/// let scope = ObservationScope::new("QUERY", "pickups");
/// // ... do work ...
/// scope.complete(&format!("rows={}", n));
/// ```
pub struct ObservationScope {
    name: &'static str,
    subject: String,
    started: Instant,
    finished: bool,
}

impl ObservationScope {
    /// Creates a scope and logs `{name}_BEGIN`.
    pub fn new(name: &'static str, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        info!(event = %format!("{}_BEGIN", name), subject = %subject);

        Self {
            name,
            subject,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Milliseconds since the scope began
    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    /// Whether `complete` or `fail` was called
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Marks the scope successful and logs `{name}_COMPLETE`.
    pub fn complete(mut self, detail: &str) {
        self.finished = true;
        info!(
            event = %format!("{}_COMPLETE", self.name),
            subject = %self.subject,
            elapsed_ms = self.elapsed_ms() as u64,
            detail,
        );
    }

    /// Marks the scope failed and logs `{name}_FAILED` at error level.
    pub fn fail(mut self, reason: &dyn Display) {
        self.finished = true;
        error!(
            event = %format!("{}_FAILED", self.name),
            subject = %self.subject,
            elapsed_ms = self.elapsed_ms() as u64,
            reason = %reason,
        );
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                event = %format!("{}_INCOMPLETE", self.name),
                subject = %self.subject,
                reason = "scope dropped without completion",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_starts_unfinished() {
        let scope = ObservationScope::new("TEST", "subject");
        assert!(!scope.is_finished());
        scope.complete("ok");
    }

    #[test]
    fn test_scope_fail_consumes() {
        let scope = ObservationScope::new("TEST", "subject");
        scope.fail(&"something went wrong");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope = ObservationScope::new("TEST", "subject");
        drop(scope);
    }
}
