//! Closed registry of analytical queries
//!
//! Each query is addressed by a stable id and owns a fixed output column
//! contract. Adding a query means adding a variant here; nothing else is
//! looked up by name.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::result::{ResultColumn, ValueType};

/// The five analytical queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum QueryKind {
    /// Pickup counts per zone
    #[serde(rename = "pickups")]
    TopPickups,
    /// Average tip per pickup zone
    #[serde(rename = "tips")]
    TipAnalysis,
    /// Trip counts per (pickup, dropoff) zone pair
    #[serde(rename = "pairs")]
    PopularRoutes,
    /// Trips touching each airport zone
    #[serde(rename = "airports")]
    AirportTraffic,
    /// Average duration per (pickup, dropoff) zone pair
    #[serde(rename = "durations")]
    TravelDuration,
}

const TOP_PICKUPS_COLUMNS: &[ResultColumn] = &[
    ResultColumn::new("pickup_zone", ValueType::Text),
    ResultColumn::new("pickups", ValueType::Int),
];

const TIP_ANALYSIS_COLUMNS: &[ResultColumn] = &[
    ResultColumn::new("pickup_zone", ValueType::Text),
    ResultColumn::new("avg_tip", ValueType::Float),
    ResultColumn::new("trip_count", ValueType::Int),
];

const POPULAR_ROUTES_COLUMNS: &[ResultColumn] = &[
    ResultColumn::new("pickup_zone", ValueType::Text),
    ResultColumn::new("dropoff_zone", ValueType::Text),
    ResultColumn::new("trip_count", ValueType::Int),
];

const AIRPORT_TRAFFIC_COLUMNS: &[ResultColumn] = &[
    ResultColumn::new("airport_zone", ValueType::Text),
    ResultColumn::new("trips", ValueType::Int),
];

const TRAVEL_DURATION_COLUMNS: &[ResultColumn] = &[
    ResultColumn::new("pickup_zone", ValueType::Text),
    ResultColumn::new("dropoff_zone", ValueType::Text),
    ResultColumn::new("avg_duration", ValueType::Float),
    ResultColumn::new("trip_count", ValueType::Int),
];

impl QueryKind {
    /// Every query, in registry order
    pub const ALL: [QueryKind; 5] = [
        QueryKind::TopPickups,
        QueryKind::TipAnalysis,
        QueryKind::PopularRoutes,
        QueryKind::AirportTraffic,
        QueryKind::TravelDuration,
    ];

    /// Stable registry id
    pub fn id(&self) -> &'static str {
        match self {
            QueryKind::TopPickups => "pickups",
            QueryKind::TipAnalysis => "tips",
            QueryKind::PopularRoutes => "pairs",
            QueryKind::AirportTraffic => "airports",
            QueryKind::TravelDuration => "durations",
        }
    }

    /// One-line description for listings
    pub fn description(&self) -> &'static str {
        match self {
            QueryKind::TopPickups => "Pickup counts per zone, busiest first",
            QueryKind::TipAnalysis => "Average tip per pickup zone, most generous first",
            QueryKind::PopularRoutes => "Trip counts per pickup/dropoff zone pair",
            QueryKind::AirportTraffic => "Trips starting or ending at each airport zone",
            QueryKind::TravelDuration => "Average trip duration per pickup/dropoff zone pair, busiest first",
        }
    }

    /// Output column contract
    pub fn columns(&self) -> &'static [ResultColumn] {
        match self {
            QueryKind::TopPickups => TOP_PICKUPS_COLUMNS,
            QueryKind::TipAnalysis => TIP_ANALYSIS_COLUMNS,
            QueryKind::PopularRoutes => POPULAR_ROUTES_COLUMNS,
            QueryKind::AirportTraffic => AIRPORT_TRAFFIC_COLUMNS,
            QueryKind::TravelDuration => TRAVEL_DURATION_COLUMNS,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unknown query id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQuery(pub String);

impl fmt::Display for UnknownQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<&str> = QueryKind::ALL.iter().map(QueryKind::id).collect();
        write!(f, "unknown query '{}' (expected one of: {})", self.0, known.join(", "))
    }
}

impl std::error::Error for UnknownQuery {}

impl FromStr for QueryKind {
    type Err = UnknownQuery;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownQuery(s.to_string()))
    }
}
