//! Parquet trip source reader
//!
//! A source file is reconciled against the canonical trip columns before any
//! row is decoded:
//! - each canonical column is located by name or alias, case-insensitively
//! - a missing required column rejects the file
//! - a missing optional column reads as null
//! - a column whose physical type cannot represent the canonical type
//!   rejects the file
//!
//! Values are normalized with arrow's cast kernels, so integer widths,
//! float widths and timestamp units in the file do not matter. Integer
//! columns stored as floats or decimals must hold whole values in `i64`
//! range; a fractional or overflowing value rejects the file rather than
//! being truncated or nulled.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{cast, cast_with_options, CastOptions};
use arrow::datatypes::{
    DataType, Float64Type, Int64Type, Schema, TimeUnit, TimestampMicrosecondType,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::schema::{from_micros, trip_columns, SchemaError, TripRecord, TRIP_SOURCE_COLUMNS};
use crate::storage::ColumnType;

use super::errors::{IngestError, IngestResult};

const BATCH_SIZE: usize = 8192;

/// `i64::MIN` and `i64::MAX + 1` as exact floats
const I64_RANGE: std::ops::Range<f64> = -9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0;

/// Decoded contents of one source file
#[derive(Debug, Default)]
pub struct SourceBatch {
    /// Rows kept after the year filter
    pub records: Vec<TripRecord>,
    /// Rows present in the file
    pub rows_read: u64,
    /// Rows dropped because their pickup fell outside the analysis year
    pub rows_outside_period: u64,
}

/// Reads one parquet trip file.
///
/// With `year` set, only rows whose pickup timestamp falls in that calendar
/// year are kept; rows with no pickup timestamp are dropped too.
pub fn read_trip_source(path: &Path, year: Option<i32>) -> IngestResult<SourceBatch> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IngestError::not_found(path),
        _ => IngestError::unreadable(path, e),
    })?;

    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| IngestError::unreadable(path, e))?;
    let plan = SourcePlan::resolve(builder.schema(), path)?;
    let reader = builder
        .with_batch_size(BATCH_SIZE)
        .build()
        .map_err(|e| IngestError::unreadable(path, e))?;

    let mut out = SourceBatch::default();
    for batch in reader {
        let batch = batch.map_err(|e| IngestError::unreadable(path, e))?;
        plan.decode(&batch, year, &mut out)
            .map_err(|e| IngestError::unreadable(path, e))?;
    }

    Ok(out)
}

/// Source column name chosen for each canonical column
#[derive(Debug)]
struct SourcePlan {
    pickup_at: String,
    dropoff_at: String,
    passenger_count: String,
    total_amount: String,
    tip_amount: Option<String>,
    pickup_zone_id: String,
    dropoff_zone_id: String,
}

impl SourcePlan {
    fn resolve(schema: &Schema, path: &Path) -> IngestResult<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let names = schema.fields().iter().map(|f| f.name().as_str());

        let mut found: Vec<(&'static str, Option<String>)> = Vec::new();
        for column in TRIP_SOURCE_COLUMNS {
            let Some(index) = column.locate(names.clone()) else {
                if column.required {
                    return Err(IngestError::schema(
                        path,
                        SchemaError::missing_column(&file_name, column.canonical),
                    ));
                }
                found.push((column.canonical, None));
                continue;
            };

            let field = schema.field(index);
            let expected = canonical_type(column.canonical);
            if !readable_as(field.data_type(), expected) {
                return Err(IngestError::schema(
                    path,
                    SchemaError::UnsupportedSourceType {
                        table: file_name,
                        column: field.name().clone(),
                        expected,
                        found: field.data_type().to_string(),
                    },
                ));
            }
            found.push((column.canonical, Some(field.name().clone())));
        }

        let mut take = |canonical: &str| -> Option<String> {
            found
                .iter_mut()
                .find(|(c, _)| *c == canonical)
                .and_then(|(_, name)| name.take())
        };
        let required = |name: Option<String>, canonical: &str| {
            name.ok_or_else(|| IngestError::schema(path, SchemaError::missing_column(&file_name, canonical)))
        };

        Ok(Self {
            pickup_at: required(take(trip_columns::PICKUP_AT), trip_columns::PICKUP_AT)?,
            dropoff_at: required(take(trip_columns::DROPOFF_AT), trip_columns::DROPOFF_AT)?,
            passenger_count: required(
                take(trip_columns::PASSENGER_COUNT),
                trip_columns::PASSENGER_COUNT,
            )?,
            total_amount: required(take(trip_columns::TOTAL_AMOUNT), trip_columns::TOTAL_AMOUNT)?,
            tip_amount: take(trip_columns::TIP_AMOUNT),
            pickup_zone_id: required(
                take(trip_columns::PICKUP_ZONE_ID),
                trip_columns::PICKUP_ZONE_ID,
            )?,
            dropoff_zone_id: required(
                take(trip_columns::DROPOFF_ZONE_ID),
                trip_columns::DROPOFF_ZONE_ID,
            )?,
        })
    }

    fn decode(
        &self,
        batch: &RecordBatch,
        year: Option<i32>,
        out: &mut SourceBatch,
    ) -> Result<(), ArrowError> {
        let timestamp_type = DataType::Timestamp(TimeUnit::Microsecond, None);

        let pickup_at = normalized(batch, &self.pickup_at, &timestamp_type)?;
        let dropoff_at = normalized(batch, &self.dropoff_at, &timestamp_type)?;
        let passengers = whole_numbers(batch, &self.passenger_count)?;
        let total = normalized(batch, &self.total_amount, &DataType::Float64)?;
        let tip = match &self.tip_amount {
            Some(name) => Some(normalized(batch, name, &DataType::Float64)?),
            None => None,
        };
        let pickup_zone = whole_numbers(batch, &self.pickup_zone_id)?;
        let dropoff_zone = whole_numbers(batch, &self.dropoff_zone_id)?;

        let pickup_at = pickup_at.as_primitive::<TimestampMicrosecondType>();
        let dropoff_at = dropoff_at.as_primitive::<TimestampMicrosecondType>();
        let passengers = passengers.as_primitive::<Int64Type>();
        let total = total.as_primitive::<Float64Type>();
        let tip = tip.as_ref().map(|a| a.as_primitive::<Float64Type>());
        let pickup_zone = pickup_zone.as_primitive::<Int64Type>();
        let dropoff_zone = dropoff_zone.as_primitive::<Int64Type>();

        out.rows_read += batch.num_rows() as u64;
        out.records.reserve(batch.num_rows());

        for row in 0..batch.num_rows() {
            let pickup = value(pickup_at, row).and_then(from_micros);
            if !in_period(pickup, year) {
                out.rows_outside_period += 1;
                continue;
            }

            let record = TripRecord::new(pickup, value(dropoff_at, row).and_then(from_micros))
                .with_passenger_count(value(passengers, row))
                .with_total_amount(value(total, row))
                .with_tip_amount(tip.and_then(|t| value(t, row)))
                .with_zones(value(pickup_zone, row), value(dropoff_zone, row));
            out.records.push(record);
        }

        Ok(())
    }
}

fn canonical_type(canonical: &str) -> ColumnType {
    match canonical {
        trip_columns::PICKUP_AT | trip_columns::DROPOFF_AT => ColumnType::Timestamp,
        trip_columns::PASSENGER_COUNT
        | trip_columns::PICKUP_ZONE_ID
        | trip_columns::DROPOFF_ZONE_ID => ColumnType::Int64,
        _ => ColumnType::Float64,
    }
}

/// Whether a source column of `found` type can be read as `expected`
fn readable_as(found: &DataType, expected: ColumnType) -> bool {
    match expected {
        ColumnType::Timestamp => matches!(found, DataType::Timestamp(_, _)),
        ColumnType::Int64 | ColumnType::Float64 => {
            found.is_integer()
                || found.is_floating()
                || matches!(found, DataType::Decimal128(_, _) | DataType::Decimal256(_, _))
        }
        ColumnType::Utf8 => matches!(found, DataType::Utf8 | DataType::LargeUtf8),
    }
}

fn source_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b ArrayRef, ArrowError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ArrowError::SchemaError(format!("column '{}' vanished from batch", name)))
}

fn normalized(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef, ArrowError> {
    cast(source_column(batch, name)?, to)
}

/// Reads an integer column as `Int64`, refusing any value that would not
/// survive the conversion unchanged.
fn whole_numbers(batch: &RecordBatch, name: &str) -> Result<ArrayRef, ArrowError> {
    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };
    let array = source_column(batch, name)?;
    if array.data_type().is_integer() {
        return cast_with_options(array, &DataType::Int64, &strict);
    }

    let floats = cast(array, &DataType::Float64)?;
    let fractional = floats
        .as_primitive::<Float64Type>()
        .iter()
        .flatten()
        .find(|v| v.fract() != 0.0 || !I64_RANGE.contains(v));
    if let Some(v) = fractional {
        return Err(ArrowError::CastError(format!(
            "column '{}' holds {}, which is not a whole number in i64 range",
            name, v
        )));
    }
    cast_with_options(&floats, &DataType::Int64, &strict)
}

fn value<T>(array: &arrow::array::PrimitiveArray<T>, row: usize) -> Option<T::Native>
where
    T: arrow::datatypes::ArrowPrimitiveType,
{
    array.is_valid(row).then(|| array.value(row))
}

fn in_period(pickup: Option<NaiveDateTime>, year: Option<i32>) -> bool {
    match year {
        None => true,
        Some(year) => pickup.is_some_and(|ts| ts.year() == year),
    }
}
