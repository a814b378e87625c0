//! Shared trip-quality filter
//!
//! Every query sees only trips that pass this filter. A null in any checked
//! field fails it.

use crate::schema::TripRecord;

/// Duration bounds in minutes, both exclusive
pub const MIN_DURATION_MINUTES: f64 = 0.0;
pub const MAX_DURATION_MINUTES: f64 = 120.0;

/// Passenger bounds, both inclusive
pub const MIN_PASSENGERS: i64 = 1;
pub const MAX_PASSENGERS: i64 = 6;

/// Total amount bounds, both exclusive
pub const MIN_TOTAL_AMOUNT: f64 = 0.0;
pub const MAX_TOTAL_AMOUNT: f64 = 200.0;

/// Applies the trip-quality policy
pub struct TripFilter;

impl TripFilter {
    /// Whether a trip is plausible enough to analyze
    pub fn matches(trip: &TripRecord) -> bool {
        let duration_ok = trip
            .trip_duration_minutes()
            .is_some_and(|d| d > MIN_DURATION_MINUTES && d < MAX_DURATION_MINUTES);
        let passengers_ok = trip
            .passenger_count()
            .is_some_and(|p| (MIN_PASSENGERS..=MAX_PASSENGERS).contains(&p));
        let total_ok = trip
            .total_amount()
            .is_some_and(|t| t > MIN_TOTAL_AMOUNT && t < MAX_TOTAL_AMOUNT);
        let zones_ok = trip.pickup_zone_id().is_some() && trip.dropoff_zone_id().is_some();

        duration_ok && passengers_ok && total_ok && zones_ok
    }

    /// Keeps matching trips, in their stored order
    pub fn apply(trips: &[TripRecord]) -> Vec<&TripRecord> {
        trips.iter().filter(|t| Self::matches(t)).collect()
    }
}
