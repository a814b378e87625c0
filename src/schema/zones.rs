//! Zone lookup records and the `zone_lookup` table

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::{ColumnData, Table};

use super::errors::{SchemaError, SchemaResult};
use super::types::{zone_columns, ZONE_LOOKUP_SCHEMA, ZONE_LOOKUP_TABLE};
use super::validator::TableValidator;

/// Service-area classification of a zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceArea {
    /// JFK and LaGuardia
    Airports,
    /// Newark
    Ewr,
    YellowZone,
    BoroZone,
    /// Anything else, kept verbatim (e.g. "N/A")
    Other(String),
}

impl ServiceArea {
    /// Parses the lookup file's `service_zone` text
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Airports" => ServiceArea::Airports,
            "EWR" => ServiceArea::Ewr,
            "Yellow Zone" => ServiceArea::YellowZone,
            "Boro Zone" => ServiceArea::BoroZone,
            other => ServiceArea::Other(other.to_string()),
        }
    }

    /// The text stored in `zone_lookup.service_zone`
    pub fn as_str(&self) -> &str {
        match self {
            ServiceArea::Airports => "Airports",
            ServiceArea::Ewr => "EWR",
            ServiceArea::YellowZone => "Yellow Zone",
            ServiceArea::BoroZone => "Boro Zone",
            ServiceArea::Other(raw) => raw,
        }
    }

    /// Airport zones are the ones classified `Airports` or `EWR`
    pub fn is_airport(&self) -> bool {
        matches!(self, ServiceArea::Airports | ServiceArea::Ewr)
    }
}

impl fmt::Display for ServiceArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the `zone_lookup` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    pub zone_id: i64,
    pub borough: String,
    pub zone: String,
    pub service_area: ServiceArea,
}

impl ZoneRecord {
    pub fn new(
        zone_id: i64,
        borough: impl Into<String>,
        zone: impl Into<String>,
        service_area: ServiceArea,
    ) -> Self {
        Self {
            zone_id,
            borough: borough.into(),
            zone: zone.into(),
            service_area,
        }
    }
}

/// Zones keyed by id, iterated in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneDirectory {
    zones: BTreeMap<i64, ZoneRecord>,
}

impl ZoneDirectory {
    /// Builds a directory, rejecting duplicate ids.
    pub fn from_records(records: Vec<ZoneRecord>) -> SchemaResult<Self> {
        let mut zones = BTreeMap::new();
        for record in records {
            let zone_id = record.zone_id;
            if zones.insert(zone_id, record).is_some() {
                return Err(SchemaError::DuplicateZone {
                    table: ZONE_LOOKUP_TABLE.to_string(),
                    zone_id,
                });
            }
        }
        Ok(Self { zones })
    }

    pub fn get(&self, zone_id: i64) -> Option<&ZoneRecord> {
        self.zones.get(&zone_id)
    }

    /// Display name of a zone, if known
    pub fn name(&self, zone_id: i64) -> Option<&str> {
        self.get(zone_id).map(|z| z.zone.as_str())
    }

    pub fn is_airport(&self, zone_id: i64) -> bool {
        self.get(zone_id)
            .is_some_and(|z| z.service_area.is_airport())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneRecord> {
        self.zones.values()
    }
}

/// Builds the `zone_lookup` table, rows in ascending id order.
pub fn zones_to_table(zones: &ZoneDirectory) -> Table {
    let text = |f: fn(&ZoneRecord) -> &str| {
        ColumnData::Utf8(zones.iter().map(|z| Some(f(z).to_string())).collect())
    };

    Table::new(ZONE_LOOKUP_TABLE)
        .with_column(
            zone_columns::ZONE_ID,
            ColumnData::Int64(zones.iter().map(|z| Some(z.zone_id)).collect()),
        )
        .with_column(zone_columns::BOROUGH, text(|z| z.borough.as_str()))
        .with_column(zone_columns::ZONE, text(|z| z.zone.as_str()))
        .with_column(zone_columns::SERVICE_ZONE, text(|z| z.service_area.as_str()))
}

/// Reads a directory back from a validated `zone_lookup` table.
pub fn zones_from_table(table: &Table) -> SchemaResult<ZoneDirectory> {
    TableValidator::validate(table, &ZONE_LOOKUP_SCHEMA)?;

    let ids = match table.column(zone_columns::ZONE_ID) {
        Some(ColumnData::Int64(v)) => v,
        _ => return Err(SchemaError::missing_column(ZONE_LOOKUP_TABLE, zone_columns::ZONE_ID)),
    };
    let text = |name: &str| match table.column(name) {
        Some(ColumnData::Utf8(v)) => Ok(v.as_slice()),
        _ => Err(SchemaError::missing_column(ZONE_LOOKUP_TABLE, name)),
    };
    let boroughs = text(zone_columns::BOROUGH)?;
    let names = text(zone_columns::ZONE)?;
    let services = text(zone_columns::SERVICE_ZONE)?;

    let mut records = Vec::with_capacity(ids.len());
    for (row, id) in ids.iter().enumerate() {
        let zone_id =
            id.ok_or_else(|| SchemaError::null_value(ZONE_LOOKUP_TABLE, zone_columns::ZONE_ID, row))?;
        records.push(ZoneRecord::new(
            zone_id,
            boroughs[row].clone().unwrap_or_default(),
            names[row].clone().unwrap_or_default(),
            ServiceArea::parse(services[row].as_deref().unwrap_or_default()),
        ));
    }

    ZoneDirectory::from_records(records)
}
