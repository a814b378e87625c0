//! Query executor for tripdb
//!
//! Runs the closed set of analytical queries against a store and returns
//! deterministic tabular results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Read the store, validating checksums and table schemas
//! 2. Filter trips by the shared trip-quality policy
//! 3. Aggregate and join zone names
//! 4. Order rows by metric, ties by zone id
//!
//! # Design Principles
//!
//! - Same store, same query: byte-identical results
//! - Fail loudly on a missing or corrupt store
//! - No state survives between executions

mod aggregate;
mod errors;
mod executor;
mod filters;
mod registry;
mod result;
mod sorter;
mod store;

pub use aggregate::{
    aggregate, airport_traffic, popular_routes, tip_analysis, top_pickups, travel_duration,
};
pub use errors::{ExecutionCause, ExecutorResult, QueryError};
pub use executor::{execute, QueryExecutor};
pub use filters::{
    TripFilter, MAX_DURATION_MINUTES, MAX_PASSENGERS, MAX_TOTAL_AMOUNT, MIN_DURATION_MINUTES,
    MIN_PASSENGERS, MIN_TOTAL_AMOUNT,
};
pub use registry::{QueryKind, UnknownQuery};
pub use result::{QueryResult, ResultColumn, Value, ValueType};
pub use sorter::ResultSorter;
pub use store::{ColumnSummary, Store, StoreSnapshot, TableSummary};
