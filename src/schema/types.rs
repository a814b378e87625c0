//! Canonical table definitions
//!
//! Two tables exist in a store, always in this order:
//!
//! - `trips`: one row per trip, timestamps in microseconds
//! - `zone_lookup`: one row per zone, `zone_id` unique
//!
//! Source files are reconciled against [`TRIP_SOURCE_COLUMNS`]: a column is
//! located by its canonical name or any alias, case-insensitively.

use crate::storage::ColumnType;

/// Name of the trips table
pub const TRIPS_TABLE: &str = "trips";

/// Name of the zone lookup table
pub const ZONE_LOOKUP_TABLE: &str = "zone_lookup";

/// One column of a canonical table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    const fn nullable(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: true,
        }
    }

    const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
        }
    }
}

/// Ordered column list of a canonical table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableSchema {
    /// Looks up a column definition by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub mod trip_columns {
    pub const PICKUP_AT: &str = "pickup_at";
    pub const DROPOFF_AT: &str = "dropoff_at";
    pub const PASSENGER_COUNT: &str = "passenger_count";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const TIP_AMOUNT: &str = "tip_amount";
    pub const PICKUP_ZONE_ID: &str = "pickup_zone_id";
    pub const DROPOFF_ZONE_ID: &str = "dropoff_zone_id";
    pub const TRIP_DURATION_MINUTES: &str = "trip_duration_minutes";
}

pub mod zone_columns {
    pub const ZONE_ID: &str = "zone_id";
    pub const BOROUGH: &str = "borough";
    pub const ZONE: &str = "zone";
    pub const SERVICE_ZONE: &str = "service_zone";
}

/// Schema of the `trips` table
pub const TRIPS_SCHEMA: TableSchema = TableSchema {
    name: TRIPS_TABLE,
    columns: &[
        ColumnDef::nullable(trip_columns::PICKUP_AT, ColumnType::Timestamp),
        ColumnDef::nullable(trip_columns::DROPOFF_AT, ColumnType::Timestamp),
        ColumnDef::nullable(trip_columns::PASSENGER_COUNT, ColumnType::Int64),
        ColumnDef::nullable(trip_columns::TOTAL_AMOUNT, ColumnType::Float64),
        ColumnDef::nullable(trip_columns::TIP_AMOUNT, ColumnType::Float64),
        ColumnDef::nullable(trip_columns::PICKUP_ZONE_ID, ColumnType::Int64),
        ColumnDef::nullable(trip_columns::DROPOFF_ZONE_ID, ColumnType::Int64),
        ColumnDef::nullable(trip_columns::TRIP_DURATION_MINUTES, ColumnType::Float64),
    ],
};

/// Schema of the `zone_lookup` table
pub const ZONE_LOOKUP_SCHEMA: TableSchema = TableSchema {
    name: ZONE_LOOKUP_TABLE,
    columns: &[
        ColumnDef::required(zone_columns::ZONE_ID, ColumnType::Int64),
        ColumnDef::nullable(zone_columns::BOROUGH, ColumnType::Utf8),
        ColumnDef::nullable(zone_columns::ZONE, ColumnType::Utf8),
        ColumnDef::nullable(zone_columns::SERVICE_ZONE, ColumnType::Utf8),
    ],
};

/// How a canonical trip column is found in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceColumn {
    /// Canonical column in the `trips` table
    pub canonical: &'static str,
    /// Accepted source names, first match wins
    pub aliases: &'static [&'static str],
    /// Missing required columns reject the file; optional ones become null
    pub required: bool,
}

impl SourceColumn {
    /// Finds this column among `names`, returning its index
    pub fn locate<'a, I>(&self, names: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        self.aliases.iter().find_map(|alias| {
            names
                .clone()
                .into_iter()
                .position(|name| name.eq_ignore_ascii_case(alias))
        })
    }
}

/// Source columns feeding the `trips` table. The derived duration is absent
/// on purpose: it is never read from input.
pub const TRIP_SOURCE_COLUMNS: &[SourceColumn] = &[
    SourceColumn {
        canonical: trip_columns::PICKUP_AT,
        aliases: &["tpep_pickup_datetime", "lpep_pickup_datetime", "pickup_datetime"],
        required: true,
    },
    SourceColumn {
        canonical: trip_columns::DROPOFF_AT,
        aliases: &["tpep_dropoff_datetime", "lpep_dropoff_datetime", "dropoff_datetime"],
        required: true,
    },
    SourceColumn {
        canonical: trip_columns::PASSENGER_COUNT,
        aliases: &["passenger_count"],
        required: true,
    },
    SourceColumn {
        canonical: trip_columns::TOTAL_AMOUNT,
        aliases: &["total_amount"],
        required: true,
    },
    SourceColumn {
        canonical: trip_columns::TIP_AMOUNT,
        aliases: &["tip_amount"],
        required: false,
    },
    SourceColumn {
        canonical: trip_columns::PICKUP_ZONE_ID,
        aliases: &["PULocationID", "pickup_location_id"],
        required: true,
    },
    SourceColumn {
        canonical: trip_columns::DROPOFF_ZONE_ID,
        aliases: &["DOLocationID", "dropoff_location_id"],
        required: true,
    },
];

/// Header of the zone lookup file, in order
pub const LOOKUP_HEADER: [&str; 4] = ["LocationID", "Borough", "Zone", "service_zone"];
