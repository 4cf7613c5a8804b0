use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use taskqueue::TaskError;

/// JSON error body paired with an http status.
#[derive(Debug, Clone, Serialize)]
pub struct RouteError {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub message: String,
}

impl RouteError {
    pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "origin not allowed")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

impl From<TaskError> for RouteError {
    fn from(why: TaskError) -> Self {
        Self::internal(why.to_string())
    }
}

impl From<scheduler::ScheduleError> for RouteError {
    fn from(why: scheduler::ScheduleError) -> Self {
        Self::internal(why.to_string())
    }
}
