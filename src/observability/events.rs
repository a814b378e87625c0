//! Observable events
//!
//! Every log line carries one of these as its `event` field. Names are
//! stable; dashboards and tests match on them.

use std::fmt;

/// Observable events in tripdb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Ingestion
    /// One source file fully decoded
    SourceRead,
    /// Zone lookup file decoded
    LookupLoaded,
    /// Rows dropped by the analysis-year filter
    RowsOutsidePeriod,
    /// New store committed over the old one
    StoreReplaced,

    // Query
    /// Store opened and verified for reading
    StoreOpened,
    /// Query finished with zero rows
    QueryEmpty,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SourceRead => "SOURCE_READ",
            Event::LookupLoaded => "LOOKUP_LOADED",
            Event::RowsOutsidePeriod => "ROWS_OUTSIDE_PERIOD",
            Event::StoreReplaced => "STORE_REPLACED",
            Event::StoreOpened => "STORE_OPENED",
            Event::QueryEmpty => "QUERY_EMPTY",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
