use std::{error, fmt};

use directions::RouteSource;
use model::task::TaskStatus;
use model::SchedulingRequest;
use scheduler::{output::render_plan, ScheduleError, Scheduler, SchedulingContext, SchedulingDefaults};

use crate::{TaskError, TaskStore};

#[derive(Debug)]
pub enum WorkerError {
    /// a claimed row disappeared between claim and load
    ClaimedRowMissing(i64),
    InvalidRequest(serde_json::Error),
    Scheduling(ScheduleError),
    Store(TaskError),
}

impl error::Error for WorkerError {}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WorkerError::ClaimedRowMissing(id) => {
                write!(f, "claimed task row {} no longer exists", id)
            }
            WorkerError::InvalidRequest(why) => write!(f, "invalid request body: {}", why),
            WorkerError::Scheduling(why) => write!(f, "scheduling failed: {}", why),
            WorkerError::Store(why) => write!(f, "{}", why),
        }
    }
}

impl From<TaskError> for WorkerError {
    fn from(why: TaskError) -> Self {
        WorkerError::Store(why)
    }
}

/// Runs one claimed task to completion: load, deserialize, schedule, persist.
/// Failures are written onto the task before surfacing, so polling clients
/// and the dispatcher log see the same message.
pub async fn process(
    store: &TaskStore,
    directions: &dyn RouteSource,
    defaults: &SchedulingDefaults,
    id: i64,
) -> Result<(), WorkerError> {
    let row = store
        .load(id)
        .await?
        .ok_or(WorkerError::ClaimedRowMissing(id))?;

    // a COMPLETED or FAILED row never transitions back; if a stale reclaim
    // raced a slow worker, leave the finished outcome alone
    if TaskStatus::parse(&row.status).is_some_and(|status| status.is_terminal()) {
        log::warn!("task row {} is already {}, skipping", id, row.status);
        return Ok(());
    }

    let request: SchedulingRequest = match serde_json::from_str(&row.request_body) {
        Ok(request) => request,
        Err(why) => {
            store.fail_task(id, &format!("invalid request body: {}", why)).await?;
            return Err(WorkerError::InvalidRequest(why));
        }
    };

    let context = SchedulingContext::for_request(&request, defaults);
    match Scheduler::new(directions, context).schedule(request.bookings).await {
        Ok(plan) => {
            let envelope = render_plan(&plan);
            let body = match serde_json::to_string(&envelope) {
                Ok(body) => body,
                Err(why) => {
                    store.fail_task(id, &format!("response encoding failed: {}", why)).await?;
                    return Err(WorkerError::Store(TaskError::Encoding(why)));
                }
            };
            store.complete_task(id, &body).await?;
            Ok(())
        }
        Err(why) => {
            store.fail_task(id, &why.to_string()).await?;
            Err(WorkerError::Scheduling(why))
        }
    }
}
