//! Zone lookup CSV reader
//!
//! The header must be exactly `LocationID,Borough,Zone,service_zone`
//! (case-insensitive). Zone ids must be present and unique.

use std::fs::File;
use std::io::{ErrorKind, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Int64Type, Schema};

use crate::schema::{
    zone_columns, SchemaError, ServiceArea, ZoneDirectory, ZoneRecord, LOOKUP_HEADER,
};

use super::errors::{IngestError, IngestResult};

/// Reads the zone lookup file into a directory.
pub fn read_zone_lookup(path: &Path) -> IngestResult<ZoneDirectory> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IngestError::not_found(path),
        _ => IngestError::unreadable(path, e),
    })?;
    let table = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(1))
        .map_err(|e| IngestError::unreadable(path, e))?;
    check_header(&inferred, &table).map_err(|e| IngestError::schema(path, e))?;
    file.rewind().map_err(|e| IngestError::unreadable(path, e))?;

    let reader = ReaderBuilder::new(lookup_schema())
        .with_header(true)
        .build(file)
        .map_err(|e| IngestError::unreadable(path, e))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| IngestError::unreadable(path, e))?;
        let ids = batch.column(0).as_primitive::<Int64Type>();
        let boroughs = batch.column(1).as_string::<i32>();
        let zones = batch.column(2).as_string::<i32>();
        let services = batch.column(3).as_string::<i32>();

        for row in 0..batch.num_rows() {
            if ids.is_null(row) {
                return Err(IngestError::schema(
                    path,
                    SchemaError::null_value(&table, zone_columns::ZONE_ID, records.len()),
                ));
            }
            let text = |array: &arrow::array::StringArray| {
                if array.is_valid(row) {
                    array.value(row).to_string()
                } else {
                    String::new()
                }
            };
            records.push(ZoneRecord::new(
                ids.value(row),
                text(boroughs),
                text(zones),
                ServiceArea::parse(&text(services)),
            ));
        }
    }

    let zones = ZoneDirectory::from_records(records).map_err(|e| match e {
        SchemaError::DuplicateZone { zone_id, .. } => {
            IngestError::schema(path, SchemaError::DuplicateZone { table, zone_id })
        }
        other => IngestError::schema(path, other),
    })?;

    Ok(zones)
}

fn lookup_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(LOOKUP_HEADER[0], DataType::Int64, true),
        Field::new(LOOKUP_HEADER[1], DataType::Utf8, true),
        Field::new(LOOKUP_HEADER[2], DataType::Utf8, true),
        Field::new(LOOKUP_HEADER[3], DataType::Utf8, true),
    ]))
}

fn check_header(inferred: &Schema, table: &str) -> Result<(), SchemaError> {
    let found: Vec<&str> = inferred.fields().iter().map(|f| f.name().as_str()).collect();
    let matches = found.len() == LOOKUP_HEADER.len()
        && found
            .iter()
            .zip(LOOKUP_HEADER.iter())
            .all(|(f, e)| f.eq_ignore_ascii_case(e));

    if matches {
        Ok(())
    } else {
        Err(SchemaError::HeaderMismatch {
            table: table.to_string(),
            expected: LOOKUP_HEADER.join(","),
            found: found.join(","),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("taxi_zone_lookup.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_reads_zones_and_classifies_airports() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "\"LocationID\",\"Borough\",\"Zone\",\"service_zone\"\n\
             1,\"EWR\",\"Newark Airport\",\"EWR\"\n\
             132,\"Queens\",\"JFK Airport\",\"Airports\"\n\
             236,\"Manhattan\",\"Upper East Side North\",\"Yellow Zone\"\n",
        );

        let zones = read_zone_lookup(&path).unwrap();
        assert_eq!(zones.len(), 3);
        assert_eq!(zones.name(132), Some("JFK Airport"));
        assert!(zones.is_airport(1));
        assert!(zones.is_airport(132));
        assert!(!zones.is_airport(236));
    }

    #[test]
    fn test_header_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "id,Borough,Zone\n1,EWR,Newark Airport\n");

        let err = read_zone_lookup(&path).unwrap_err();
        assert!(matches!(
            err,
            IngestError::SchemaMismatch {
                source: SchemaError::HeaderMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "LocationID,Borough,Zone,service_zone\n7,Queens,Astoria,Boro Zone\n7,Queens,Astoria,Boro Zone\n",
        );

        let err = read_zone_lookup(&path).unwrap_err();
        assert!(matches!(
            err,
            IngestError::SchemaMismatch {
                source: SchemaError::DuplicateZone { zone_id: 7, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = read_zone_lookup(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.code(), "TRIPDB_SOURCE_NOT_FOUND");
    }
}
