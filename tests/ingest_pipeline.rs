//! Ingestion Pipeline Tests
//!
//! Covers:
//! - Derived durations are exact for hand-picked timestamp pairs
//! - The analysis-year filter
//! - Re-ingestion replaces rather than appends
//! - Failed ingestion leaves the previous store untouched
//! - A file named twice is ingested once
//! - Source reconciliation errors name the offending file

mod common;

use std::fs;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampNanosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::NaiveDate;
use common::*;
use rstest::rstest;
use tripdb::executor::{execute, QueryKind, Store, Value};
use tripdb::ingest::{IngestError, IngestOptions, Ingestor};
use tripdb::schema::SchemaError;

// =============================================================================
// Derived Duration
// =============================================================================

#[test]
fn test_duration_is_exact_for_hand_picked_pairs() {
    let ws = Workspace::new();
    let rows = vec![
        // sub-minute
        TripRow::new(MIDTOWN, ASTORIA, 0.0).between(ts(1, 3, 9, 0, 0), ts(1, 3, 9, 0, 45)),
        // multi-hour
        TripRow::new(MIDTOWN, ASTORIA, 0.0).between(ts(1, 3, 6, 10, 0), ts(1, 3, 9, 40, 30)),
        // cross-midnight
        TripRow::new(MIDTOWN, ASTORIA, 0.0).between(ts(1, 3, 23, 52, 0), ts(1, 4, 0, 7, 30)),
        // negative, kept in storage
        TripRow::new(MIDTOWN, ASTORIA, 0.0).between(ts(1, 3, 12, 5, 0), ts(1, 3, 12, 0, 0)),
    ];
    let source = ws.source("yellow_tripdata_2024-01.parquet", &rows);

    ws.ingestor().ingest(&[source], &ws.lookup_path()).unwrap();

    let snapshot = Store::new(ws.store_path()).connect().unwrap();
    let durations: Vec<Option<f64>> = snapshot
        .trips
        .iter()
        .map(|t| t.trip_duration_minutes())
        .collect();
    assert_eq!(
        durations,
        vec![Some(0.75), Some(210.5), Some(15.5), Some(-5.0)]
    );
}

#[test]
fn test_missing_timestamp_gives_null_duration() {
    let ws = Workspace::new();
    let mut row = TripRow::new(MIDTOWN, ASTORIA, 10.0);
    row.dropoff = None;
    let source = ws.source("jan.parquet", &[row]);

    ws.ingestor().ingest(&[source], &ws.lookup_path()).unwrap();

    let snapshot = Store::new(ws.store_path()).connect().unwrap();
    assert_eq!(snapshot.trips.len(), 1);
    assert_eq!(snapshot.trips[0].trip_duration_minutes(), None);
}

// =============================================================================
// Year Filter
// =============================================================================

#[test]
fn test_rows_outside_analysis_year_are_not_stored() {
    let ws = Workspace::new();
    let rows = vec![
        TripRow::new(MIDTOWN, ASTORIA, 10.0),
        TripRow::new(MIDTOWN, ASTORIA, 10.0).at(
            NaiveDate::from_ymd_opt(2023, 12, 31)
                .and_then(|d| d.and_hms_opt(23, 59, 59))
                .unwrap(),
        ),
        TripRow::new(MIDTOWN, ASTORIA, 10.0).at(
            NaiveDate::from_ymd_opt(2002, 12, 31)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
                .unwrap(),
        ),
    ];
    let source = ws.source("jan.parquet", &rows);

    let report = ws.ingestor().ingest(&[source], &ws.lookup_path()).unwrap();

    assert_eq!(report.rows_read, 3);
    assert_eq!(report.rows_outside_period, 2);
    assert_eq!(report.trips_stored, 1);
}

#[test]
fn test_no_year_keeps_every_row() {
    let ws = Workspace::new();
    let rows = vec![
        TripRow::new(MIDTOWN, ASTORIA, 10.0),
        TripRow::new(MIDTOWN, ASTORIA, 10.0).at(
            NaiveDate::from_ymd_opt(2023, 6, 1)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
                .unwrap(),
        ),
    ];
    let source = ws.source("jan.parquet", &rows);

    let report = Ingestor::new(ws.store_path(), IngestOptions::default())
        .ingest(&[source], &ws.lookup_path())
        .unwrap();

    assert_eq!(report.rows_outside_period, 0);
    assert_eq!(report.trips_stored, 2);
}

// =============================================================================
// Replace Semantics
// =============================================================================

#[test]
fn test_reingestion_yields_identical_store() {
    let ws = Workspace::new();
    ws.source("yellow_tripdata_2024-01.parquet", &[TripRow::new(JFK, MIDTOWN, 35.0)]);
    ws.source(
        "yellow_tripdata_2024-02.parquet",
        &[
            TripRow::new(MIDTOWN, LGA, 25.0).at(ts(2, 2, 17, 30, 0)),
            TripRow::new(ASTORIA, MIDTOWN, 12.5).at(ts(2, 3, 7, 45, 0)),
        ],
    );
    let sources = vec![ws.data_dir()];

    let first = ws.ingestor().ingest(&sources, &ws.lookup_path()).unwrap();
    let first_bytes = fs::read(ws.store_path()).unwrap();
    let first_snapshot = Store::new(ws.store_path()).connect().unwrap();

    let second = ws.ingestor().ingest(&sources, &ws.lookup_path()).unwrap();
    let second_bytes = fs::read(ws.store_path()).unwrap();
    let second_snapshot = Store::new(ws.store_path()).connect().unwrap();

    assert_eq!(first.trips_stored, 3);
    assert_eq!(first, second);
    assert_eq!(first_snapshot, second_snapshot);
    assert_eq!(first_bytes, second_bytes, "re-ingestion must replace, not append");
}

#[test]
fn test_directory_source_reads_files_in_name_order() {
    let ws = Workspace::new();
    let feb = ws.source("yellow_tripdata_2024-02.parquet", &[TripRow::new(JFK, MIDTOWN, 30.0)]);
    let jan = ws.source("yellow_tripdata_2024-01.parquet", &[TripRow::new(LGA, MIDTOWN, 30.0)]);

    let report = ws.ingestor().ingest(&[ws.data_dir()], &ws.lookup_path()).unwrap();

    let order: Vec<_> = report.sources.iter().map(|s| s.path.clone()).collect();
    let expected = vec![fs::canonicalize(jan).unwrap(), fs::canonicalize(feb).unwrap()];
    assert_eq!(order, expected);
    assert_eq!(report.zones_stored, 7);
}

#[test]
fn test_file_named_twice_is_ingested_once() {
    let ws = Workspace::new();
    ws.source("yellow_tripdata_2024-01.parquet", &[TripRow::new(ASTORIA, MIDTOWN, 12.0)]);
    fs::create_dir(ws.data_dir().join("sub")).unwrap();
    let dotted = ws
        .data_dir()
        .join("sub")
        .join("..")
        .join("yellow_tripdata_2024-01.parquet");

    let report = ws
        .ingestor()
        .ingest(&[ws.data_dir(), dotted], &ws.lookup_path())
        .unwrap();

    assert_eq!(report.sources.len(), 1);
    assert_eq!(report.trips_stored, 1);

    let result = execute(QueryKind::TopPickups, &Store::new(ws.store_path())).unwrap();
    assert_eq!(result.rows, vec![vec![Value::from("Astoria"), Value::Int(1)]]);
}

#[test]
fn test_failed_ingestion_leaves_previous_store_untouched() {
    let ws = Workspace::new();
    let good = ws.source("jan.parquet", &[TripRow::new(JFK, MIDTOWN, 30.0)]);
    ws.ingestor().ingest(&[good.clone()], &ws.lookup_path()).unwrap();
    let before = fs::read(ws.store_path()).unwrap();

    let corrupt = ws.data_dir().join("feb.parquet");
    fs::write(&corrupt, b"definitely not parquet").unwrap();
    let err = ws
        .ingestor()
        .ingest(&[good, corrupt], &ws.lookup_path())
        .unwrap_err();

    assert!(matches!(err, IngestError::SourceUnreadable { .. }));
    assert_eq!(fs::read(ws.store_path()).unwrap(), before);
    let leftovers: Vec<_> = fs::read_dir(ws.store_path().parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "no temp files may survive: {:?}", leftovers);
}

// =============================================================================
// Error Taxonomy
// =============================================================================

#[test]
fn test_missing_source_is_source_not_found() {
    let ws = Workspace::new();
    let err = ws
        .ingestor()
        .ingest(&[ws.data_dir().join("yellow_tripdata_2024-13.parquet")], &ws.lookup_path())
        .unwrap_err();

    assert!(matches!(err, IngestError::SourceNotFound { .. }));
    assert!(!ws.store_path().exists());
}

#[rstest]
#[case::above_limit(6.5)]
#[case::below_one(0.5)]
#[case::overflow(1e30)]
fn test_non_whole_passenger_count_is_rejected(#[case] passengers: f64) {
    let ws = Workspace::new();
    let source = ws.source(
        "yellow_tripdata_2024-01.parquet",
        &[
            TripRow::new(ASTORIA, MIDTOWN, 12.0),
            TripRow::new(ASTORIA, MIDTOWN, 12.0).passengers(Some(passengers)),
        ],
    );

    let err = ws.ingestor().ingest(&[source], &ws.lookup_path()).unwrap_err();

    match &err {
        IngestError::SourceUnreadable { path, reason } => {
            assert!(path.ends_with("yellow_tripdata_2024-01.parquet"));
            assert!(reason.contains("passenger_count"), "{}", reason);
        }
        other => panic!("expected SourceUnreadable, got {}", other),
    }
    assert!(!ws.store_path().exists());
}

#[test]
fn test_missing_lookup_is_source_not_found() {
    let ws = Workspace::new();
    let source = ws.source("jan.parquet", &[TripRow::new(JFK, MIDTOWN, 30.0)]);

    let err = ws
        .ingestor()
        .ingest(&[source], &ws.data_dir().join("zones.csv"))
        .unwrap_err();

    assert_eq!(err.code(), "TRIPDB_SOURCE_NOT_FOUND");
    assert!(!ws.store_path().exists());
}

#[test]
fn test_missing_required_column_is_schema_mismatch() {
    let ws = Workspace::new();
    let path = ws.data_dir().join("yellow_tripdata_2024-03.parquet");
    let ts_type = DataType::Timestamp(TimeUnit::Nanosecond, None);
    let schema = Schema::new(vec![
        Field::new("tpep_pickup_datetime", ts_type.clone(), true),
        Field::new("tpep_dropoff_datetime", ts_type, true),
        Field::new("passenger_count", DataType::Int64, true),
        Field::new("PULocationID", DataType::Int64, true),
        Field::new("DOLocationID", DataType::Int64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampNanosecondArray::from(vec![Some(1_704_096_000_000_000_000)])),
        Arc::new(TimestampNanosecondArray::from(vec![Some(1_704_096_600_000_000_000)])),
        Arc::new(Int64Array::from(vec![Some(1)])),
        Arc::new(Int64Array::from(vec![Some(132)])),
        Arc::new(Int64Array::from(vec![Some(161)])),
    ];
    write_batch(&path, schema, columns);

    let err = ws.ingestor().ingest(&[path], &ws.lookup_path()).unwrap_err();

    match err {
        IngestError::SchemaMismatch { path, source } => {
            assert!(path.ends_with("yellow_tripdata_2024-03.parquet"));
            assert!(matches!(source, SchemaError::MissingColumn { ref column, .. } if column == "total_amount"));
        }
        other => panic!("expected SchemaMismatch, got {}", other),
    }
}

#[test]
fn test_text_fare_column_is_schema_mismatch() {
    let ws = Workspace::new();
    let path = ws.data_dir().join("odd.parquet");
    let ts_type = DataType::Timestamp(TimeUnit::Microsecond, None);
    let schema = Schema::new(vec![
        Field::new("tpep_pickup_datetime", ts_type.clone(), true),
        Field::new("tpep_dropoff_datetime", ts_type, true),
        Field::new("passenger_count", DataType::Int64, true),
        Field::new("total_amount", DataType::Utf8, true),
        Field::new("PULocationID", DataType::Int64, true),
        Field::new("DOLocationID", DataType::Int64, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(arrow::array::TimestampMicrosecondArray::from(vec![Some(1_704_096_000_000_000)])),
        Arc::new(arrow::array::TimestampMicrosecondArray::from(vec![Some(1_704_096_600_000_000)])),
        Arc::new(Int64Array::from(vec![Some(1)])),
        Arc::new(StringArray::from(vec![Some("$12.50")])),
        Arc::new(Int64Array::from(vec![Some(132)])),
        Arc::new(Int64Array::from(vec![Some(161)])),
    ];
    write_batch(&path, schema, columns);

    let err = ws.ingestor().ingest(&[path], &ws.lookup_path()).unwrap_err();
    assert_eq!(err.code(), "TRIPDB_SCHEMA_MISMATCH");
}

#[test]
fn test_nanosecond_sources_and_missing_tip_are_reconciled() {
    let ws = Workspace::new();
    let path = ws.data_dir().join("green.parquet");
    let ts_type = DataType::Timestamp(TimeUnit::Nanosecond, None);
    let schema = Schema::new(vec![
        Field::new("lpep_pickup_datetime", ts_type.clone(), true),
        Field::new("lpep_dropoff_datetime", ts_type, true),
        Field::new("passenger_count", DataType::Int64, true),
        Field::new("total_amount", DataType::Float64, true),
        Field::new("pulocationid", DataType::Int64, true),
        Field::new("dolocationid", DataType::Int64, true),
    ]);
    // 2024-01-01 08:00:00 and 08:10:30
    let columns: Vec<ArrayRef> = vec![
        Arc::new(TimestampNanosecondArray::from(vec![Some(1_704_096_000_000_000_000)])),
        Arc::new(TimestampNanosecondArray::from(vec![Some(1_704_096_630_000_000_000)])),
        Arc::new(Int64Array::from(vec![Some(2)])),
        Arc::new(Float64Array::from(vec![Some(18.25)])),
        Arc::new(Int64Array::from(vec![Some(132)])),
        Arc::new(Int64Array::from(vec![Some(161)])),
    ];
    write_batch(&path, schema, columns);

    ws.ingestor().ingest(&[path], &ws.lookup_path()).unwrap();

    let snapshot = Store::new(ws.store_path()).connect().unwrap();
    let trip = &snapshot.trips[0];
    assert_eq!(trip.trip_duration_minutes(), Some(10.5));
    assert_eq!(trip.tip_amount(), None);
    assert_eq!(trip.pickup_zone_id(), Some(132));
    assert_eq!(trip.passenger_count(), Some(2));
}

#[test]
fn test_lookup_header_mismatch_is_schema_mismatch() {
    let ws = Workspace::new();
    let source = ws.source("jan.parquet", &[TripRow::new(JFK, MIDTOWN, 30.0)]);
    let lookup = ws.data_dir().join("bad_lookup.csv");
    fs::write(&lookup, "id,name\n1,Newark Airport\n").unwrap();

    let err = ws.ingestor().ingest(&[source], &lookup).unwrap_err();
    assert!(matches!(
        err,
        IngestError::SchemaMismatch {
            source: SchemaError::HeaderMismatch { .. },
            ..
        }
    ));
}
