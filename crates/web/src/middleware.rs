use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::RouteError, AppState};

pub fn origin_allowed(acceptable: &[String], origin: Option<&str>) -> bool {
    origin
        .map(|origin| acceptable.iter().any(|allowed| allowed == origin))
        .unwrap_or(false)
}

/// Rejects requests whose `Origin` header is not in the configured allow
/// list. A no-op unless the check is enabled.
pub async fn origin_check(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.config.enable_origin_check {
        let origin = request
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok());
        if !origin_allowed(&state.config.acceptable_origins, origin) {
            return RouteError::forbidden().into_response();
        }
    }
    next.run(request).await
}
