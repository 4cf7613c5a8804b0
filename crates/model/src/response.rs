use serde::{Deserialize, Serialize};

use crate::Booking;

/// Outer response envelope of the scheduling endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub result: SchedulingResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingResult {
    pub status: String,
    pub error_code: i32,
    pub message: String,
    pub data: SchedulingData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingData {
    pub vehicle_trip_list: Vec<VehicleEntry>,
}

impl ResponseEnvelope {
    pub fn success(data: SchedulingData) -> Self {
        Self {
            result: SchedulingResult {
                status: "success".to_owned(),
                error_code: 0,
                message: String::new(),
                data,
            },
        }
    }
}

/// One planned shuttle. The identity fields stay null; the plan assigns
/// synthetic vehicles, real shuttles and drivers are attached downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleEntry {
    pub shuttle_name: String,
    pub shuttle_id: Option<i64>,
    pub shuttle_license_plate: Option<String>,
    pub driver_id: Option<i64>,
    pub driver_first_name: Option<String>,
    pub driver_last_name: Option<String>,
    pub trips: Vec<TripEntry>,
}

impl VehicleEntry {
    pub fn unassigned(shuttle_name: String, trips: Vec<TripEntry>) -> Self {
        Self {
            shuttle_name,
            shuttle_id: None,
            shuttle_license_plate: None,
            driver_id: None,
            driver_first_name: None,
            driver_last_name: None,
            trips,
        }
    }
}

/// One leg of a shuttle's day. Carries exactly one booking; the first-pickup
/// and last-dropoff fields therefore equal the booking's own endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripEntry {
    pub program_id: Option<i64>,
    pub program_name: Option<String>,

    /// 12-hour clock in the trip's zone
    pub first_pickup_time: String,
    pub last_dropoff_time: String,

    pub first_pickup_latitude: Option<f64>,
    pub first_pickup_longitude: Option<f64>,
    pub last_dropoff_latitude: Option<f64>,
    pub last_dropoff_longitude: Option<f64>,

    pub bookings: Vec<Booking>,

    pub driver_id: Option<i64>,
    pub driver_first_name: Option<String>,
    pub driver_last_name: Option<String>,
    pub action: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_vehicle_serializes_null_identity() {
        let entry = VehicleEntry::unassigned("1AMBI".to_owned(), Vec::new());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["shuttle_name"], "1AMBI");
        assert!(value["shuttle_id"].is_null());
        assert!(value["driver_first_name"].is_null());
    }

    #[test]
    fn envelope_shape_matches_contract() {
        let envelope = ResponseEnvelope::success(SchedulingData {
            vehicle_trip_list: Vec::new(),
        });
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["result"]["error_code"], 0);
        assert_eq!(value["result"]["status"], "success");
        assert!(value["result"]["data"]["vehicle_trip_list"].is_array());
    }
}
