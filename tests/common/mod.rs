//! Shared fixtures for integration tests
//!
//! Trip files are real parquet written through `ArrowWriter` with the column
//! names and physical types of the published yellow-taxi files.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use tripdb::ingest::{IngestOptions, Ingestor};

pub const EWR: i32 = 1;
pub const ASTORIA: i32 = 7;
pub const JFK: i32 = 132;
pub const LGA: i32 = 138;
pub const MIDTOWN: i32 = 161;
pub const UPPER_EAST_SIDE: i32 = 236;

/// One source row
#[derive(Debug, Clone)]
pub struct TripRow {
    pub pickup: Option<NaiveDateTime>,
    pub dropoff: Option<NaiveDateTime>,
    pub passengers: Option<f64>,
    pub total: Option<f64>,
    pub tip: Option<f64>,
    pub pickup_zone: Option<i32>,
    pub dropoff_zone: Option<i32>,
}

pub fn ts(month: u32, day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .expect("valid fixture timestamp")
}

impl TripRow {
    /// A plausible trip: one passenger, $20 fare, $2 tip, picked up 2024-01-15 08:00
    pub fn new(pickup_zone: i32, dropoff_zone: i32, minutes: f64) -> Self {
        let pickup = ts(1, 15, 8, 0, 0);
        Self {
            pickup: Some(pickup),
            dropoff: Some(pickup + micros(minutes)),
            passengers: Some(1.0),
            total: Some(20.0),
            tip: Some(2.0),
            pickup_zone: Some(pickup_zone),
            dropoff_zone: Some(dropoff_zone),
        }
    }

    /// Moves the pickup, keeping the duration
    pub fn at(mut self, pickup: NaiveDateTime) -> Self {
        if let (Some(old), Some(dropoff)) = (self.pickup, self.dropoff) {
            self.dropoff = Some(pickup + (dropoff - old));
        }
        self.pickup = Some(pickup);
        self
    }

    pub fn between(mut self, pickup: NaiveDateTime, dropoff: NaiveDateTime) -> Self {
        self.pickup = Some(pickup);
        self.dropoff = Some(dropoff);
        self
    }

    pub fn passengers(mut self, passengers: Option<f64>) -> Self {
        self.passengers = passengers;
        self
    }

    pub fn total(mut self, total: Option<f64>) -> Self {
        self.total = total;
        self
    }

    pub fn tip(mut self, tip: Option<f64>) -> Self {
        self.tip = tip;
        self
    }
}

fn micros(minutes: f64) -> Duration {
    Duration::microseconds((minutes * 60_000_000.0).round() as i64)
}

fn to_micros(ts: Option<NaiveDateTime>) -> Option<i64> {
    ts.map(|t| t.and_utc().timestamp_micros())
}

/// Writes yellow-taxi style parquet
pub fn write_trips(path: &Path, rows: &[TripRow]) {
    write_trips_with(path, rows, true)
}

/// Writes parquet, optionally without the `tip_amount` column
pub fn write_trips_with(path: &Path, rows: &[TripRow], with_tip: bool) {
    let ts_type = DataType::Timestamp(TimeUnit::Microsecond, None);
    let mut fields = vec![
        Field::new("VendorID", DataType::Int32, true),
        Field::new("tpep_pickup_datetime", ts_type.clone(), true),
        Field::new("tpep_dropoff_datetime", ts_type, true),
        Field::new("passenger_count", DataType::Float64, true),
        Field::new("PULocationID", DataType::Int32, true),
        Field::new("DOLocationID", DataType::Int32, true),
        Field::new("total_amount", DataType::Float64, true),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![Some(2); rows.len()])),
        Arc::new(TimestampMicrosecondArray::from(
            rows.iter().map(|r| to_micros(r.pickup)).collect::<Vec<_>>(),
        )),
        Arc::new(TimestampMicrosecondArray::from(
            rows.iter().map(|r| to_micros(r.dropoff)).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.passengers).collect::<Vec<_>>())),
        Arc::new(Int32Array::from(rows.iter().map(|r| r.pickup_zone).collect::<Vec<_>>())),
        Arc::new(Int32Array::from(rows.iter().map(|r| r.dropoff_zone).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.total).collect::<Vec<_>>())),
    ];
    if with_tip {
        fields.push(Field::new("tip_amount", DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.tip).collect::<Vec<_>>(),
        )));
    }

    write_batch(path, Schema::new(fields), columns);
}

/// Writes arbitrary columns to a parquet file
pub fn write_batch(path: &Path, schema: Schema, columns: Vec<ArrayRef>) {
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("valid fixture batch");
    let file = File::create(path).expect("create fixture parquet");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("open parquet writer");
    writer.write(&batch).expect("write fixture batch");
    writer.close().expect("close parquet writer");
}

/// Writes the zone lookup used across tests
pub fn write_lookup(path: &Path) {
    let body = "\"LocationID\",\"Borough\",\"Zone\",\"service_zone\"\n\
                1,\"EWR\",\"Newark Airport\",\"EWR\"\n\
                7,\"Queens\",\"Astoria\",\"Boro Zone\"\n\
                132,\"Queens\",\"JFK Airport\",\"Airports\"\n\
                138,\"Queens\",\"LaGuardia Airport\",\"Airports\"\n\
                161,\"Manhattan\",\"Midtown Center\",\"Yellow Zone\"\n\
                236,\"Manhattan\",\"Upper East Side North\",\"Yellow Zone\"\n\
                264,\"Unknown\",\"N/A\",\"N/A\"\n";
    fs::write(path, body).expect("write fixture lookup");
}

/// Scratch layout: `data/` with the lookup, `db/` for the store
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("data")).expect("create data dir");
        write_lookup(&dir.path().join("data").join("taxi_zone_lookup.csv"));
        Self { dir }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn lookup_path(&self) -> PathBuf {
        self.data_dir().join("taxi_zone_lookup.csv")
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("db").join("taxi.tripdb")
    }

    /// Writes `data/<name>` and returns its path
    pub fn source(&self, name: &str, rows: &[TripRow]) -> PathBuf {
        let path = self.data_dir().join(name);
        write_trips(&path, rows);
        path
    }

    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(self.store_path(), IngestOptions::for_year(2024))
    }
}
