use chrono::{DateTime, Duration, Utc};
use model::task::{TaskResponse, TaskStatus};
use model::SchedulingRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::TaskError;

/// One persisted scheduling job. `id` is the internal row id handed to
/// workers; `task_id` is the public identifier.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub task_id: Uuid,
    pub request_body: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error_message: Option<String>,
    pub response_body: Option<String>,
}

/// Durable task queue in a Postgres table. Claims are atomic row locks, so
/// two dispatchers can never hand out the same row; eviction is a periodic
/// sweep over `updated_at`.
#[derive(Clone)]
pub struct TaskStore {
    pool: PgPool,
    table: String,
    ttl: Duration,
}

fn valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TaskStore {
    pub async fn connect(uri: &str, table: &str, ttl_ms: u64) -> Result<Self, TaskError> {
        if !valid_identifier(table) {
            return Err(TaskError::InvalidConfig(format!(
                "'{}' is not a valid table name",
                table
            )));
        }

        let pool = PgPool::connect(uri).await?;
        sqlx::query(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                task_id UUID NOT NULL,
                request_body TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                error_message TEXT,
                response_body TEXT
            );
            ",
        ))
        .execute(&pool)
        .await?;
        sqlx::query(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {table}_task_id_idx ON {table} (task_id);",
        ))
        .execute(&pool)
        .await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_updated_at_idx ON {table} (updated_at);",
        ))
        .execute(&pool)
        .await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_status_idx ON {table} (status);",
        ))
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            table: table.to_owned(),
            ttl: Duration::milliseconds(ttl_ms as i64),
        })
    }

    /// Persists a request as a PENDING task and returns its public id.
    pub async fn create_task(&self, request: &SchedulingRequest) -> Result<Uuid, TaskError> {
        let task_id = Uuid::new_v4();
        let body = serde_json::to_string(request)?;
        sqlx::query(&format!(
            "
            INSERT INTO {} (task_id, request_body, status, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now());
            ",
            self.table
        ))
        .bind(task_id)
        .bind(&body)
        .bind(TaskStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;
        Ok(task_id)
    }

    pub async fn get_task(&self, task_id: Uuid) -> Result<Option<TaskResponse>, TaskError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "SELECT * FROM {} WHERE task_id = $1;",
            self.table
        ))
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let status = TaskStatus::parse(&row.status)
                .ok_or_else(|| TaskError::InvalidStatus(row.status.clone()))?;
            let result = match &row.response_body {
                Some(body) => Some(serde_json::from_str(body)?),
                None => None,
            };
            Ok(TaskResponse {
                task_id: row.task_id,
                status,
                created_at: row.created_at,
                updated_at: row.updated_at,
                result,
                error: row.error_message,
            })
        })
        .transpose()
    }

    /// Atomically flips up to `batch` PENDING rows to PROCESSING and returns
    /// their internal ids. The row lock with `SKIP LOCKED` makes the
    /// select-and-update a single race-free round trip.
    pub async fn claim_batch(&self, batch: usize) -> Result<Vec<i64>, TaskError> {
        let ids: Vec<i64> = sqlx::query_scalar(&format!(
            "
            UPDATE {table} SET status = $1, updated_at = now()
            WHERE id IN (
                SELECT id FROM {table}
                WHERE status = $2
                ORDER BY created_at
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id;
            ",
            table = self.table
        ))
        .bind(TaskStatus::Processing.as_str())
        .bind(TaskStatus::Pending.as_str())
        .bind(batch as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Loads a claimed row for a worker.
    pub async fn load(&self, id: i64) -> Result<Option<TaskRow>, TaskError> {
        let row = sqlx::query_as(&format!("SELECT * FROM {} WHERE id = $1;", self.table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn complete_task(&self, id: i64, response_body: &str) -> Result<(), TaskError> {
        sqlx::query(&format!(
            "
            UPDATE {} SET status = $1, updated_at = now(), response_body = $2
            WHERE id = $3;
            ",
            self.table
        ))
        .bind(TaskStatus::Completed.as_str())
        .bind(response_body)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn fail_task(&self, id: i64, error_message: &str) -> Result<(), TaskError> {
        sqlx::query(&format!(
            "
            UPDATE {} SET status = $1, updated_at = now(), error_message = $2
            WHERE id = $3;
            ",
            self.table
        ))
        .bind(TaskStatus::Failed.as_str())
        .bind(error_message)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes rows whose `updated_at` fell behind the TTL. A TTL of zero
    /// disables eviction.
    pub async fn sweep_expired(&self) -> Result<u64, TaskError> {
        if self.ttl <= Duration::zero() {
            return Ok(0);
        }
        let cutoff = Utc::now() - self.ttl;
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE updated_at < $1;",
            self.table
        ))
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Puts PROCESSING rows whose worker went quiet back into the queue.
    /// The inactivity threshold is half the TTL, so an abandoned task gets
    /// another chance well before eviction would reap it.
    pub async fn reclaim_stale(&self) -> Result<u64, TaskError> {
        if self.ttl <= Duration::zero() {
            return Ok(0);
        }
        let cutoff = Utc::now() - self.ttl / 2;
        let result = sqlx::query(&format!(
            "
            UPDATE {} SET status = $1, updated_at = now()
            WHERE status = $2 AND updated_at < $3;
            ",
            self.table
        ))
        .bind(TaskStatus::Pending.as_str())
        .bind(TaskStatus::Processing.as_str())
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
