use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single passenger pickup-to-dropoff request as submitted by the booking
/// system. Fields the scheduler does not interpret (fares, payment, program
/// bookkeeping) are captured in `extra` and written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default)]
    pub booking_id: i64,

    #[serde(default)]
    pub passenger_id: String,
    #[serde(default)]
    pub passenger_first_name: String,
    #[serde(default)]
    pub passenger_last_name: String,

    #[serde(default)]
    pub pickup_address: String,
    #[serde(default)]
    pub pickup_address_id: Option<i64>,
    #[serde(default)]
    pub pickup_latitude: Option<f64>,
    #[serde(default)]
    pub pickup_longitude: Option<f64>,

    #[serde(default)]
    pub dropoff_address: String,
    #[serde(default)]
    pub dropoff_address_id: Option<i64>,
    #[serde(default)]
    pub dropoff_latitude: Option<f64>,
    #[serde(default)]
    pub dropoff_longitude: Option<f64>,

    /// requested pickup time of day, "HH:MM"
    #[serde(default)]
    pub pickup_time: String,

    /// IANA zone of the program the booking belongs to. Fallback when the
    /// pickup address does not resolve to a zone.
    #[serde(default)]
    pub program_timezone: String,

    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub program_name: Option<String>,

    /// free-text assistance tags ("Wheelchair", "Stretcher", ...)
    #[serde(default)]
    pub mobility_assistance: Vec<String>,

    /// filled by the scheduler from the routed estimate
    #[serde(default)]
    pub travel_distance: Option<i64>,
    #[serde(default)]
    pub travel_time: Option<i64>,

    #[serde(default)]
    pub scheduled_pickup_time: Option<String>,
    #[serde(default)]
    pub scheduled_dropoff_time: Option<String>,
    #[serde(default)]
    pub actual_pickup_time: Option<String>,
    #[serde(default)]
    pub actual_dropoff_time: Option<String>,
    #[serde(default)]
    pub driver_arrival_time: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Booking {
    /// Display identity of the passenger: the id when present, otherwise the
    /// concatenated name.
    pub fn passenger(&self) -> String {
        if self.passenger_id.is_empty() {
            format!("{} {}", self.passenger_first_name, self.passenger_last_name)
        } else {
            self.passenger_id.clone()
        }
    }
}
