use chrono::Duration;
use model::SchedulingRequest;

/// Process-wide fallback margins, in seconds. Loaded from the environment at
/// startup and shared read-only by the sync endpoint and the workers.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingDefaults {
    pub before_pickup_secs: i64,
    pub after_pickup_secs: i64,
    pub dropoff_unloading_secs: i64,
    pub debug: bool,
}

/// Margins and date of one scheduling run, resolved once per request so
/// concurrent requests never observe each other's overrides.
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    pub date: String,
    /// how early a shuttle must be able to arrive for an outgoing pickup
    pub before_pickup: Duration,
    /// how late a shuttle may arrive on a last leg
    pub after_pickup: Duration,
    /// time blocked at the dropoff before the shuttle is free again
    pub dropoff_unloading: Duration,
    pub debug: bool,
}

impl SchedulingContext {
    pub fn for_request(request: &SchedulingRequest, defaults: &SchedulingDefaults) -> Self {
        Self {
            date: request.date.clone(),
            before_pickup: Duration::seconds(
                request.before_pickup_time.unwrap_or(defaults.before_pickup_secs),
            ),
            after_pickup: Duration::seconds(
                request.after_pickup_time.unwrap_or(defaults.after_pickup_secs),
            ),
            dropoff_unloading: Duration::seconds(
                request
                    .dropoff_unloading_time
                    .unwrap_or(defaults.dropoff_unloading_secs),
            ),
            debug: request.debug.unwrap_or(defaults.debug),
        }
    }
}
