use serde::{Deserialize, Serialize};

use crate::Booking;

/// Body of a scheduling request. The three time overrides are in seconds and
/// fall back to the process-wide defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingRequest {
    /// calendar day to plan, "Month Day, Year" (e.g. "January 15, 2025")
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub debug: Option<bool>,

    #[serde(default)]
    pub before_pickup_time: Option<i64>,
    #[serde(default)]
    pub after_pickup_time: Option<i64>,
    #[serde(default)]
    pub dropoff_unloading_time: Option<i64>,

    #[serde(default)]
    pub bookings: Vec<Booking>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_optional() {
        let request: SchedulingRequest = serde_json::from_value(serde_json::json!({
            "date": "January 15, 2025",
            "bookings": [],
        }))
        .unwrap();
        assert!(request.before_pickup_time.is_none());
        assert!(request.debug.is_none());
        assert!(request.bookings.is_empty());
    }

    #[test]
    fn overrides_parse_as_seconds() {
        let request: SchedulingRequest = serde_json::from_value(serde_json::json!({
            "date": "January 15, 2025",
            "before_pickup_time": 300,
            "after_pickup_time": 900,
            "dropoff_unloading_time": 120,
        }))
        .unwrap();
        assert_eq!(request.before_pickup_time, Some(300));
        assert_eq!(request.after_pickup_time, Some(900));
        assert_eq!(request.dropoff_unloading_time, Some(120));
    }
}
