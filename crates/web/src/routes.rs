use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use model::response::ResponseEnvelope;
use model::task::{EnqueuedTask, TaskResponse};
use model::SchedulingRequest;
use scheduler::{output::render_plan, Scheduler, SchedulingContext};
use uuid::Uuid;

use crate::{error::RouteError, middleware::origin_check, AppState};

pub fn routes(state: AppState) -> Router {
    let scheduling = Router::new()
        .route("/", post(calculate))
        .route("/enqueue", post(enqueue))
        .route("/:task_id", get(task_status))
        .layer(axum::middleware::from_fn_with_state(state.clone(), origin_check))
        .with_state(state);

    Router::new()
        .route("/", get(health))
        .nest("/v1_webapp_auto_scheduling", scheduling)
        .fallback(unknown_route)
}

async fn unknown_route() -> RouteError {
    RouteError::not_found("no such route")
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

type Payload = Result<Json<SchedulingRequest>, JsonRejection>;

fn parse_payload(payload: Payload) -> Result<SchedulingRequest, RouteError> {
    payload
        .map(|Json(request)| request)
        .map_err(|why| RouteError::bad_request(format!("invalid request body: {}", why)))
}

/// Synchronous scheduling: plans the whole request before answering.
async fn calculate(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Json<ResponseEnvelope>, RouteError> {
    let request = parse_payload(payload)?;
    let context = SchedulingContext::for_request(&request, &state.defaults);
    let plan = Scheduler::new(state.directions.as_ref(), context)
        .schedule(request.bookings)
        .await?;
    Ok(Json(render_plan(&plan)))
}

/// Asynchronous intake: the request is persisted and picked up by the
/// dispatcher; clients poll the returned task id.
async fn enqueue(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<(StatusCode, Json<EnqueuedTask>), RouteError> {
    let request = parse_payload(payload)?;
    let task_id = state.store.create_task(&request).await?;
    Ok((StatusCode::CREATED, Json(EnqueuedTask { task_id })))
}

async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskResponse>, RouteError> {
    state
        .store
        .get_task(task_id)
        .await?
        .map(Json)
        .ok_or_else(|| RouteError::not_found(format!("task {} does not exist", task_id)))
}
