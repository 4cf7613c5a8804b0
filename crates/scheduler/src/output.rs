use model::response::{ResponseEnvelope, SchedulingData, TripEntry, VehicleEntry};
use model::{Plan, Trip};
use utility::format::{format_local, format_time_12h};

/// Renders a finished plan into the response envelope. Scheduled times are
/// written back onto the booking in the trip's zone; actual and driver
/// fields stay null until dispatch.
pub fn render_plan(plan: &Plan) -> ResponseEnvelope {
    ResponseEnvelope::success(SchedulingData {
        vehicle_trip_list: plan
            .iter()
            .map(|vehicle| {
                VehicleEntry::unassigned(
                    vehicle.shuttle_name(),
                    vehicle.trips.iter().map(trip_entry).collect(),
                )
            })
            .collect(),
    })
}

fn trip_entry(trip: &Trip) -> TripEntry {
    let pickup = trip.adjusted_pickup_time.unwrap_or(trip.pickup_time);
    let dropoff = trip.dropoff_time();

    let mut booking = trip.booking.clone();
    booking.scheduled_pickup_time = Some(format_local(pickup, trip.timezone));
    booking.scheduled_dropoff_time = Some(format_local(dropoff, trip.timezone));
    booking.actual_pickup_time = None;
    booking.actual_dropoff_time = None;
    booking.driver_arrival_time = None;

    TripEntry {
        program_id: booking.program_id,
        program_name: booking.program_name.clone(),
        first_pickup_time: format_time_12h(pickup, trip.timezone),
        last_dropoff_time: format_time_12h(dropoff, trip.timezone),
        first_pickup_latitude: booking.pickup_latitude,
        first_pickup_longitude: booking.pickup_longitude,
        last_dropoff_latitude: booking.dropoff_latitude,
        last_dropoff_longitude: booking.dropoff_longitude,
        bookings: vec![booking],
        driver_id: None,
        driver_first_name: None,
        driver_last_name: None,
        action: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::Tz;
    use model::{Trip, Vehicle};

    #[test]
    fn rendering_fills_scheduled_times_and_nulls_actuals() {
        let pickup = Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap();
        let mut trip = Trip::new(
            serde_json::from_value(serde_json::json!({
                "booking_id": 12,
                "pickup_address": "350 5th Ave, New York, NY 10118",
                "dropoff_address": "11 Wall St, New York, NY 10005",
                "pickup_latitude": 40.748,
                "pickup_longitude": -73.985,
                "actual_pickup_time": "whatever upstream sent",
            }))
            .unwrap(),
            Tz::America__New_York,
            pickup,
            10_000,
            900,
        );
        trip.adjusted_pickup_time = Some(pickup + Duration::seconds(120));

        let mut vehicle = Vehicle::new(1);
        vehicle.add_trip(trip);
        let envelope = render_plan(&vec![vehicle]);

        let vehicles = &envelope.result.data.vehicle_trip_list;
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].shuttle_name, "1AMBI");
        assert!(vehicles[0].driver_id.is_none());

        let entry = &vehicles[0].trips[0];
        assert_eq!(entry.first_pickup_time, "09:02 AM");
        assert_eq!(entry.last_dropoff_time, "09:17 AM");
        assert_eq!(entry.first_pickup_latitude, Some(40.748));

        let booking = &entry.bookings[0];
        assert_eq!(
            booking.scheduled_pickup_time.as_deref(),
            Some("2025-01-15 09:02:00")
        );
        assert_eq!(
            booking.scheduled_dropoff_time.as_deref(),
            Some("2025-01-15 09:17:00")
        );
        assert!(booking.actual_pickup_time.is_none());
    }
}
