use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::{Booking, MobilityAssistance};

/// Scheduler-internal view of a booking: absolute instants in the booking's
/// zone plus the routed pickup→dropoff estimate. Everything except the
/// scheduling outputs (`is_last`, the adjusted times) is fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct Trip {
    pub booking: Booking,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub passenger: String,
    pub assistance: MobilityAssistance,
    pub timezone: Tz,
    pub pickup_time: DateTime<Utc>,
    pub distance_in_meter: i64,
    pub duration_in_sec: i64,
    pub is_last: bool,
    pub adjusted_pickup_time: Option<DateTime<Utc>>,
    pub earliest_arrival_time: Option<DateTime<Utc>>,
}

impl Trip {
    pub fn new(
        booking: Booking,
        timezone: Tz,
        pickup_time: DateTime<Utc>,
        distance_in_meter: i64,
        duration_in_sec: i64,
    ) -> Self {
        Self {
            pickup_address: booking.pickup_address.clone(),
            dropoff_address: booking.dropoff_address.clone(),
            passenger: booking.passenger(),
            assistance: MobilityAssistance::from_tags(&booking.mobility_assistance),
            booking,
            timezone,
            pickup_time,
            distance_in_meter,
            duration_in_sec,
            is_last: false,
            adjusted_pickup_time: None,
            earliest_arrival_time: None,
        }
    }

    /// Latest acceptable arrival of a shuttle at the pickup. Only a last leg
    /// earns the late window; outgoing trips must be picked up on time.
    pub fn latest_pickup_time(&self, after_pickup: Duration) -> DateTime<Utc> {
        if self.is_last {
            self.pickup_time + after_pickup
        } else {
            self.pickup_time
        }
    }

    /// Earliest acceptable arrival at the pickup.
    pub fn earliest_pickup_time(&self, before_pickup: Duration) -> DateTime<Utc> {
        if self.is_last {
            self.pickup_time
        } else {
            self.pickup_time - before_pickup
        }
    }

    /// When the passenger is dropped off, based on the adjusted pickup when
    /// the trip has been scheduled.
    pub fn dropoff_time(&self) -> DateTime<Utc> {
        self.adjusted_pickup_time.unwrap_or(self.pickup_time)
            + Duration::seconds(self.duration_in_sec)
    }

    /// When the shuttle is free again after unloading.
    pub fn finish_time(&self, dropoff_unloading: Duration) -> DateTime<Utc> {
        self.dropoff_time() + dropoff_unloading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trip_at(pickup: DateTime<Utc>) -> Trip {
        Trip::new(
            serde_json::from_value(serde_json::json!({
                "booking_id": 1,
                "pickup_address": "1 Main St 02134",
                "dropoff_address": "9 Elm St 02134",
            }))
            .unwrap(),
            chrono_tz::America::New_York,
            pickup,
            8_000,
            600,
        )
    }

    #[test]
    fn window_bounds_depend_on_last_leg_flag() {
        let pickup = Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap();
        let mut trip = trip_at(pickup);
        let before = Duration::seconds(300);
        let after = Duration::seconds(900);

        assert_eq!(trip.latest_pickup_time(after), pickup);
        assert_eq!(trip.earliest_pickup_time(before), pickup - before);

        trip.is_last = true;
        assert_eq!(trip.latest_pickup_time(after), pickup + after);
        assert_eq!(trip.earliest_pickup_time(before), pickup);
    }

    #[test]
    fn dropoff_uses_adjusted_pickup_once_assigned() {
        let pickup = Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap();
        let mut trip = trip_at(pickup);
        assert_eq!(trip.dropoff_time(), pickup + Duration::seconds(600));

        let adjusted = pickup + Duration::seconds(120);
        trip.adjusted_pickup_time = Some(adjusted);
        assert_eq!(trip.dropoff_time(), adjusted + Duration::seconds(600));
        assert_eq!(
            trip.finish_time(Duration::seconds(60)),
            adjusted + Duration::seconds(660)
        );
    }
}
