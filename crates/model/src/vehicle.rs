use crate::{MobilityAssistance, Trip};

/// An ordered list of trips served by one hypothetical shuttle. Trips are
/// appended in assignment order; the scheduler guarantees consecutive trips
/// are reachable in time before appending.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// 1-based, assigned on creation. Creation order is output order.
    pub index: usize,
    pub trips: Vec<Trip>,
}

pub type Plan = Vec<Vehicle>;

impl Vehicle {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            trips: Vec::new(),
        }
    }

    pub fn add_trip(&mut self, trip: Trip) {
        self.trips.push(trip);
    }

    pub fn last_trip(&self) -> Option<&Trip> {
        self.trips.last()
    }

    /// Union of the assistance requirements of every trip on this vehicle.
    pub fn capabilities(&self) -> MobilityAssistance {
        self.trips
            .iter()
            .map(|trip| trip.assistance)
            .reduce(MobilityAssistance::union)
            .unwrap_or(MobilityAssistance::AMBULATORY)
    }

    /// Synthetic name of the form `<index><code>`, e.g. "1AMBI" or "2GURWC".
    pub fn shuttle_name(&self) -> String {
        format!("{}{}", self.index, self.capabilities().capability_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn trip_with_tags(tags: &[&str]) -> Trip {
        Trip::new(
            serde_json::from_value(serde_json::json!({
                "booking_id": 1,
                "pickup_address": "a",
                "dropoff_address": "b",
                "mobility_assistance": tags,
            }))
            .unwrap(),
            chrono_tz::America::Chicago,
            Utc.with_ymd_and_hms(2025, 1, 15, 15, 0, 0).unwrap(),
            1000,
            60,
        )
    }

    #[test]
    fn shuttle_name_combines_index_and_capability_union() {
        let mut vehicle = Vehicle::new(3);
        vehicle.add_trip(trip_with_tags(&[]));
        assert_eq!(vehicle.shuttle_name(), "3AMBI");

        vehicle.add_trip(trip_with_tags(&["stretcher"]));
        assert_eq!(vehicle.shuttle_name(), "3GURAMBI");
    }

    #[test]
    fn empty_vehicle_reports_ambulatory_baseline() {
        // a vehicle only exists because a trip is about to be appended, but
        // the union must still be a valid mask
        let vehicle = Vehicle::new(1);
        assert_eq!(vehicle.capabilities(), MobilityAssistance::AMBULATORY);
    }
}
