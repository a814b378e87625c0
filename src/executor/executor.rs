//! Query execution
//!
//! Execution order for one query:
//! 1. Open the store, verify and decode both tables, release the file
//! 2. Keep trips passing the shared trip filter
//! 3. Aggregate, joining zone names from the lookup
//! 4. Rank deterministically
//!
//! Execution is read-only and holds no state between calls.

use tracing::info;

use crate::observability::{Event, ObservationScope};

use super::aggregate::aggregate;
use super::errors::{ExecutorResult, QueryError};
use super::filters::TripFilter;
use super::registry::QueryKind;
use super::result::QueryResult;
use super::store::Store;

/// Runs registry queries against a store
pub struct QueryExecutor<'a> {
    store: &'a Store,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Executes one query.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` if nothing was ever ingested at the store path
    /// - `QueryExecutionError` if the store cannot be read or validated
    pub fn execute(&self, kind: QueryKind) -> ExecutorResult<QueryResult> {
        let scope = ObservationScope::new("QUERY", kind.id());

        let snapshot = match self.store.connect() {
            Ok(snapshot) => snapshot,
            Err(cause) => {
                let err = QueryError::from_cause(kind, self.store.path().to_path_buf(), cause);
                scope.fail(&err);
                return Err(err);
            }
        };

        let trips = TripFilter::apply(&snapshot.trips);
        let result = aggregate(kind, &trips, &snapshot.zones);

        if result.is_empty() {
            info!(
                event = %Event::QueryEmpty,
                query = kind.id(),
                trips_scanned = snapshot.trips.len() as u64,
                trips_matched = trips.len() as u64,
            );
        }
        scope.complete(&format!(
            "scanned={} matched={} rows={}",
            snapshot.trips.len(),
            trips.len(),
            result.len()
        ));

        Ok(result)
    }
}

/// Executes `kind` against `store`.
pub fn execute(kind: QueryKind, store: &Store) -> ExecutorResult<QueryResult> {
    QueryExecutor::new(store).execute(kind)
}
