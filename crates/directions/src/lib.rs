use std::{error, fmt, sync::Arc};

use async_trait::async_trait;
use cache::Cache;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DIRECTIONS_API_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// First-leg estimate of a routed pickup→dropoff pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_in_meter: i64,
    pub duration_in_sec: i64,
}

#[derive(Debug, Clone)]
pub enum DirectionsError {
    RequestError(Arc<reqwest::Error>),
    /// the provider answered with a non-OK HTTP response or status field
    RoutingUnavailable {
        status: String,
        message: Option<String>,
    },
}

impl error::Error for DirectionsError {}

impl fmt::Display for DirectionsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DirectionsError::RequestError(why) => write!(f, "routing request error: {}", why),
            DirectionsError::RoutingUnavailable { status, message } => match message {
                Some(message) => {
                    write!(f, "routing unavailable ({}): {}", status, message)
                }
                None => write!(f, "routing unavailable ({})", status),
            },
        }
    }
}

impl From<reqwest::Error> for DirectionsError {
    fn from(why: reqwest::Error) -> Self {
        DirectionsError::RequestError(Arc::new(why))
    }
}

/// Routing lookup seam. The production implementation queries the Google
/// Directions API through the configured cache; tests script it.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Estimated travel from `from` to `to` leaving at `departure_at`.
    /// `Ok(None)` means the provider found no route.
    async fn get_direction(
        &self,
        from: &str,
        to: &str,
        departure_at: DateTime<Utc>,
    ) -> Result<Option<RouteEstimate>, DirectionsError>;
}

pub struct GoogleDirections {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    cache: Option<Arc<dyn Cache<RouteEstimate>>>,
}

impl GoogleDirections {
    pub fn new(api_key: String, cache: Option<Arc<dyn Cache<RouteEstimate>>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DIRECTIONS_API_URL.to_owned(),
            cache,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

fn cache_key(from: &str, to: &str) -> String {
    format!("{}|{}", from, to)
}

/// The provider rejects departure times in the past, so the parameter is only
/// sent for future departures: unix seconds, rounded up.
fn departure_param(departure_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    if departure_at > now {
        let millis = departure_at.timestamp_millis();
        Some((millis + 999).div_euclid(1000))
    } else {
        None
    }
}

fn first_leg(response: DirectionsResponse) -> Option<RouteEstimate> {
    let route = response.routes.into_iter().next()?;
    let leg = route.legs.into_iter().next()?;
    Some(RouteEstimate {
        distance_in_meter: leg.distance.value,
        duration_in_sec: leg.duration.value,
    })
}

#[async_trait]
impl RouteSource for GoogleDirections {
    async fn get_direction(
        &self,
        from: &str,
        to: &str,
        departure_at: DateTime<Utc>,
    ) -> Result<Option<RouteEstimate>, DirectionsError> {
        let key = cache_key(from, to);
        if let Some(cache) = &self.cache {
            if let Some(estimate) = cache.get(&key).await {
                log::debug!("directions cache hit for '{}'", key);
                return Ok(Some(estimate));
            }
        }

        let mut request = self
            .http
            .get(&self.base_url)
            .query(&[
                ("origin", from),
                ("destination", to),
                ("key", self.api_key.as_str()),
            ]);
        if let Some(departure) = departure_param(departure_at, Utc::now()) {
            request = request.query(&[("departure_time", departure.to_string())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(DirectionsError::RoutingUnavailable {
                status: response.status().to_string(),
                message: response.text().await.ok(),
            });
        }

        let body: DirectionsResponse = response.json().await?;
        if body.status != "OK" {
            return Err(DirectionsError::RoutingUnavailable {
                status: body.status,
                message: body.error_message,
            });
        }

        let estimate = first_leg(body);
        if let (Some(cache), Some(estimate)) = (&self.cache, estimate) {
            cache.put(&key, estimate).await;
        }
        Ok(estimate)
    }
}

// - provider wire format -

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: TextValue,
    duration: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: i64,
}
