//! Trip records and the `trips` table
//!
//! `trip_duration_minutes` is derived from the two timestamps whenever a
//! record is built. Negative durations are kept; only queries filter them.

use chrono::{DateTime, NaiveDateTime};

use crate::storage::{ColumnData, Table};

use super::errors::{SchemaError, SchemaResult};
use super::types::{trip_columns, TRIPS_SCHEMA, TRIPS_TABLE};
use super::validator::TableValidator;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;

/// Exact elapsed minutes between two instants, fractional and signed.
///
/// Returns `None` when either timestamp is missing.
pub fn trip_duration_minutes(
    pickup_at: Option<NaiveDateTime>,
    dropoff_at: Option<NaiveDateTime>,
) -> Option<f64> {
    let elapsed = dropoff_at? - pickup_at?;
    elapsed
        .num_microseconds()
        .map(|micros| micros as f64 / MICROS_PER_MINUTE)
}

/// Converts a naive (UTC-interpreted) timestamp to epoch microseconds
pub fn to_micros(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_micros()
}

/// Converts epoch microseconds back to a naive timestamp
pub fn from_micros(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}

/// One row of the `trips` table
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pickup_at: Option<NaiveDateTime>,
    dropoff_at: Option<NaiveDateTime>,
    passenger_count: Option<i64>,
    total_amount: Option<f64>,
    tip_amount: Option<f64>,
    pickup_zone_id: Option<i64>,
    dropoff_zone_id: Option<i64>,
    trip_duration_minutes: Option<f64>,
}

impl TripRecord {
    /// Creates a record with only its timestamps set; the duration is
    /// derived here and nowhere else.
    pub fn new(pickup_at: Option<NaiveDateTime>, dropoff_at: Option<NaiveDateTime>) -> Self {
        Self {
            pickup_at,
            dropoff_at,
            passenger_count: None,
            total_amount: None,
            tip_amount: None,
            pickup_zone_id: None,
            dropoff_zone_id: None,
            trip_duration_minutes: trip_duration_minutes(pickup_at, dropoff_at),
        }
    }

    pub fn with_passenger_count(mut self, passenger_count: Option<i64>) -> Self {
        self.passenger_count = passenger_count;
        self
    }

    pub fn with_total_amount(mut self, total_amount: Option<f64>) -> Self {
        self.total_amount = total_amount;
        self
    }

    pub fn with_tip_amount(mut self, tip_amount: Option<f64>) -> Self {
        self.tip_amount = tip_amount;
        self
    }

    pub fn with_zones(mut self, pickup_zone_id: Option<i64>, dropoff_zone_id: Option<i64>) -> Self {
        self.pickup_zone_id = pickup_zone_id;
        self.dropoff_zone_id = dropoff_zone_id;
        self
    }

    pub fn pickup_at(&self) -> Option<NaiveDateTime> {
        self.pickup_at
    }

    pub fn dropoff_at(&self) -> Option<NaiveDateTime> {
        self.dropoff_at
    }

    pub fn passenger_count(&self) -> Option<i64> {
        self.passenger_count
    }

    pub fn total_amount(&self) -> Option<f64> {
        self.total_amount
    }

    pub fn tip_amount(&self) -> Option<f64> {
        self.tip_amount
    }

    pub fn pickup_zone_id(&self) -> Option<i64> {
        self.pickup_zone_id
    }

    pub fn dropoff_zone_id(&self) -> Option<i64> {
        self.dropoff_zone_id
    }

    pub fn trip_duration_minutes(&self) -> Option<f64> {
        self.trip_duration_minutes
    }
}

/// Builds the `trips` table from records, columns in canonical order.
pub fn trips_to_table(records: &[TripRecord]) -> Table {
    let timestamps = |f: fn(&TripRecord) -> Option<NaiveDateTime>| {
        ColumnData::Timestamp(records.iter().map(|r| f(r).map(to_micros)).collect())
    };
    let ints = |f: fn(&TripRecord) -> Option<i64>| {
        ColumnData::Int64(records.iter().map(f).collect())
    };
    let floats = |f: fn(&TripRecord) -> Option<f64>| {
        ColumnData::Float64(records.iter().map(f).collect())
    };

    Table::new(TRIPS_TABLE)
        .with_column(trip_columns::PICKUP_AT, timestamps(TripRecord::pickup_at))
        .with_column(trip_columns::DROPOFF_AT, timestamps(TripRecord::dropoff_at))
        .with_column(trip_columns::PASSENGER_COUNT, ints(TripRecord::passenger_count))
        .with_column(trip_columns::TOTAL_AMOUNT, floats(TripRecord::total_amount))
        .with_column(trip_columns::TIP_AMOUNT, floats(TripRecord::tip_amount))
        .with_column(trip_columns::PICKUP_ZONE_ID, ints(TripRecord::pickup_zone_id))
        .with_column(trip_columns::DROPOFF_ZONE_ID, ints(TripRecord::dropoff_zone_id))
        .with_column(
            trip_columns::TRIP_DURATION_MINUTES,
            floats(TripRecord::trip_duration_minutes),
        )
}

/// Reads records back from a validated `trips` table.
pub fn trips_from_table(table: &Table) -> SchemaResult<Vec<TripRecord>> {
    TableValidator::validate(table, &TRIPS_SCHEMA)?;

    let ints = |name: &str| match table.column(name) {
        Some(ColumnData::Int64(v)) | Some(ColumnData::Timestamp(v)) => Ok(v.as_slice()),
        _ => Err(SchemaError::missing_column(TRIPS_TABLE, name)),
    };
    let floats = |name: &str| match table.column(name) {
        Some(ColumnData::Float64(v)) => Ok(v.as_slice()),
        _ => Err(SchemaError::missing_column(TRIPS_TABLE, name)),
    };

    let pickup = ints(trip_columns::PICKUP_AT)?;
    let dropoff = ints(trip_columns::DROPOFF_AT)?;
    let passengers = ints(trip_columns::PASSENGER_COUNT)?;
    let total = floats(trip_columns::TOTAL_AMOUNT)?;
    let tip = floats(trip_columns::TIP_AMOUNT)?;
    let pickup_zone = ints(trip_columns::PICKUP_ZONE_ID)?;
    let dropoff_zone = ints(trip_columns::DROPOFF_ZONE_ID)?;
    let duration = floats(trip_columns::TRIP_DURATION_MINUTES)?;

    let records = (0..table.row_count())
        .map(|i| TripRecord {
            pickup_at: pickup[i].and_then(from_micros),
            dropoff_at: dropoff[i].and_then(from_micros),
            passenger_count: passengers[i],
            total_amount: total[i],
            tip_amount: tip[i],
            pickup_zone_id: pickup_zone[i],
            dropoff_zone_id: dropoff_zone[i],
            trip_duration_minutes: duration[i],
        })
        .collect();

    Ok(records)
}
