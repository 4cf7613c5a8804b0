use std::collections::HashMap;

use model::Trip;

/// Sorts trips by pickup time and flags, for every passenger with at least
/// two trips in the day, the latest one as the return leg. Only that trip
/// earns the late-arrival window.
pub fn mark_last_legs(trips: &mut [Trip]) {
    trips.sort_by_key(|trip| trip.pickup_time);

    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();
    for (index, trip) in trips.iter().enumerate() {
        let entry = seen.entry(trip.passenger.clone()).or_insert((0, index));
        entry.0 += 1;
        // sorted ascending, so the running last index is the latest pickup
        entry.1 = index;
    }
    for (count, index) in seen.values() {
        if *count >= 2 {
            trips[*index].is_last = true;
        }
    }
}

/// Splits trips into the three scheduling passes: stretcher, wheelchair,
/// everything else. Relative order within a bucket is preserved, so each
/// bucket stays sorted by pickup time.
pub fn bucket_by_assistance(trips: Vec<Trip>) -> [Vec<Trip>; 3] {
    let mut buckets: [Vec<Trip>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for trip in trips {
        buckets[trip.assistance.priority_bucket()].push(trip);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};
    use chrono_tz::Tz;

    fn trip(passenger: &str, hour: u32, tags: &[&str]) -> Trip {
        Trip::new(
            serde_json::from_value(serde_json::json!({
                "booking_id": 1,
                "passenger_id": passenger,
                "pickup_address": "a",
                "dropoff_address": "b",
                "mobility_assistance": tags,
            }))
            .unwrap(),
            Tz::America__New_York,
            Utc.with_ymd_and_hms(2025, 1, 15, hour, 0, 0).unwrap(),
            1000,
            600,
        )
    }

    #[test]
    fn only_the_latest_trip_of_a_round_trip_is_last() {
        let mut trips = vec![trip("p1", 22, &[]), trip("p1", 14, &[]), trip("p2", 15, &[])];
        mark_last_legs(&mut trips);

        assert_eq!(trips[0].pickup_time.hour(), 14);
        assert!(!trips[0].is_last);
        assert!(!trips[1].is_last);
        assert!(trips[2].is_last);
        assert_eq!(trips[2].pickup_time.hour(), 22);
    }

    #[test]
    fn single_trip_passengers_are_never_last() {
        let mut trips = vec![trip("p1", 9, &[]), trip("p2", 10, &[])];
        mark_last_legs(&mut trips);
        assert!(trips.iter().all(|trip| !trip.is_last));
    }

    #[test]
    fn buckets_split_by_capability_and_keep_time_order() {
        let mut trips = vec![
            trip("p1", 10, &["stretcher"]),
            trip("p2", 9, &["wheelchair"]),
            trip("p3", 8, &[]),
            trip("p4", 7, &["wheelchair"]),
        ];
        mark_last_legs(&mut trips);
        let [stretcher, wheelchair, rest] = bucket_by_assistance(trips);

        assert_eq!(stretcher.len(), 1);
        assert_eq!(stretcher[0].passenger, "p1");
        assert_eq!(wheelchair.len(), 2);
        assert_eq!(wheelchair[0].passenger, "p4");
        assert_eq!(wheelchair[1].passenger, "p2");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].passenger, "p3");
    }
}
