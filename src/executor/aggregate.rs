//! Per-query aggregations
//!
//! Each function takes already-filtered trips and the zone directory and
//! builds a complete result. Zone ids missing from the directory are
//! dropped (inner-join semantics). Grouping goes through `BTreeMap` so
//! intermediate iteration order never depends on hashing.

use std::collections::BTreeMap;

use crate::schema::{TripRecord, ZoneDirectory};

use super::registry::QueryKind;
use super::result::{QueryResult, Value};
use super::sorter::ResultSorter;

/// Dispatches to the aggregation for `kind`
pub fn aggregate(kind: QueryKind, trips: &[&TripRecord], zones: &ZoneDirectory) -> QueryResult {
    match kind {
        QueryKind::TopPickups => top_pickups(trips, zones),
        QueryKind::TipAnalysis => tip_analysis(trips, zones),
        QueryKind::PopularRoutes => popular_routes(trips, zones),
        QueryKind::AirportTraffic => airport_traffic(trips, zones),
        QueryKind::TravelDuration => travel_duration(trips, zones),
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: i64,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

fn zone_pair(trip: &TripRecord) -> Option<(i64, i64)> {
    Some((trip.pickup_zone_id()?, trip.dropoff_zone_id()?))
}

/// Pickup counts per zone, busiest first
pub fn top_pickups(trips: &[&TripRecord], zones: &ZoneDirectory) -> QueryResult {
    let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
    for zone in trips.iter().filter_map(|t| t.pickup_zone_id()) {
        if zones.get(zone).is_some() {
            *counts.entry(zone).or_default() += 1;
        }
    }

    let mut ranked: Vec<(i64, i64)> = counts.into_iter().collect();
    ResultSorter::rank_desc(&mut ranked, |r| r.1 as f64, |r| r.0);

    let mut result = QueryResult::empty(QueryKind::TopPickups);
    for (zone, pickups) in ranked {
        result.push_row(vec![zone_name(zones, zone), Value::Int(pickups)]);
    }
    result
}

/// Average tip per pickup zone, most generous first.
///
/// Trips with no recorded tip count towards `trip_count` but not towards
/// the average; a zone where every tip is missing averages 0.0.
pub fn tip_analysis(trips: &[&TripRecord], zones: &ZoneDirectory) -> QueryResult {
    let mut groups: BTreeMap<i64, (Mean, i64)> = BTreeMap::new();
    for trip in trips {
        let Some(zone) = trip.pickup_zone_id() else {
            continue;
        };
        if zones.get(zone).is_none() {
            continue;
        }
        let (tips, count) = groups.entry(zone).or_default();
        if let Some(tip) = trip.tip_amount() {
            tips.add(tip);
        }
        *count += 1;
    }

    let mut ranked: Vec<(i64, f64, i64)> = groups
        .into_iter()
        .map(|(zone, (tips, count))| (zone, tips.value(), count))
        .collect();
    ResultSorter::rank_desc(&mut ranked, |r| r.1, |r| r.0);

    let mut result = QueryResult::empty(QueryKind::TipAnalysis);
    for (zone, avg_tip, count) in ranked {
        result.push_row(vec![zone_name(zones, zone), Value::Float(avg_tip), Value::Int(count)]);
    }
    result
}

/// Trip counts per zone pair, most travelled first
pub fn popular_routes(trips: &[&TripRecord], zones: &ZoneDirectory) -> QueryResult {
    let mut counts: BTreeMap<(i64, i64), i64> = BTreeMap::new();
    for pair in trips.iter().filter_map(|t| zone_pair(t)) {
        if zones.get(pair.0).is_some() && zones.get(pair.1).is_some() {
            *counts.entry(pair).or_default() += 1;
        }
    }

    let mut ranked: Vec<((i64, i64), i64)> = counts.into_iter().collect();
    ResultSorter::rank_desc(&mut ranked, |r| r.1 as f64, |r| r.0);

    let mut result = QueryResult::empty(QueryKind::PopularRoutes);
    for ((pickup, dropoff), count) in ranked {
        result.push_row(vec![
            zone_name(zones, pickup),
            zone_name(zones, dropoff),
            Value::Int(count),
        ]);
    }
    result
}

/// Trips touching each airport zone, busiest first.
///
/// A trip counts once for each distinct airport endpoint: an airport to
/// airport trip between two different airports counts for both, a loop at
/// one airport counts once.
pub fn airport_traffic(trips: &[&TripRecord], zones: &ZoneDirectory) -> QueryResult {
    let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
    for (pickup, dropoff) in trips.iter().filter_map(|t| zone_pair(t)) {
        if zones.is_airport(pickup) {
            *counts.entry(pickup).or_default() += 1;
        }
        if dropoff != pickup && zones.is_airport(dropoff) {
            *counts.entry(dropoff).or_default() += 1;
        }
    }

    let mut ranked: Vec<(i64, i64)> = counts.into_iter().collect();
    ResultSorter::rank_desc(&mut ranked, |r| r.1 as f64, |r| r.0);

    let mut result = QueryResult::empty(QueryKind::AirportTraffic);
    for (zone, count) in ranked {
        result.push_row(vec![zone_name(zones, zone), Value::Int(count)]);
    }
    result
}

/// Average trip duration per zone pair, busiest pair first
pub fn travel_duration(trips: &[&TripRecord], zones: &ZoneDirectory) -> QueryResult {
    let mut groups: BTreeMap<(i64, i64), Mean> = BTreeMap::new();
    for trip in trips {
        let (Some(pair), Some(minutes)) = (zone_pair(trip), trip.trip_duration_minutes()) else {
            continue;
        };
        if zones.get(pair.0).is_some() && zones.get(pair.1).is_some() {
            groups.entry(pair).or_default().add(minutes);
        }
    }

    let mut ranked: Vec<((i64, i64), Mean)> = groups.into_iter().collect();
    ResultSorter::rank_desc(&mut ranked, |r| r.1.count as f64, |r| r.0);

    let mut result = QueryResult::empty(QueryKind::TravelDuration);
    for ((pickup, dropoff), mean) in ranked {
        result.push_row(vec![
            zone_name(zones, pickup),
            zone_name(zones, dropoff),
            Value::Float(mean.value()),
            Value::Int(mean.count),
        ]);
    }
    result
}

fn zone_name(zones: &ZoneDirectory, zone_id: i64) -> Value {
    Value::Text(zones.name(zone_id).unwrap_or_default().to_string())
}
