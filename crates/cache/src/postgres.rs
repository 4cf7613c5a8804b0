use std::{marker::PhantomData, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;

use crate::{Cache, CacheError};

/// Cache entries in a Postgres table with a unique key index. Postgres has no
/// TTL index, so expiry is a cutoff filter on reads plus a periodic
/// `clean_expired` sweep (spawned by the factory).
pub struct PgCache<V> {
    pool: PgPool,
    table: String,
    ttl: Duration,
    _values: PhantomData<fn() -> V>,
}

fn valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl<V> PgCache<V> {
    pub async fn connect(uri: &str, table: &str, ttl: Duration) -> Result<Self, CacheError> {
        // the table name is interpolated into statements and must not be a
        // bindable value, so restrict it to a plain identifier
        if !valid_identifier(table) {
            return Err(CacheError::InvalidConfig(format!(
                "'{}' is not a valid table name",
                table
            )));
        }

        let pool = PgPool::connect(uri).await?;
        sqlx::query(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                key TEXT NOT NULL,
                value JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            ",
        ))
        .execute(&pool)
        .await?;
        sqlx::query(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {table}_key_idx ON {table} (key);",
        ))
        .execute(&pool)
        .await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_created_at_idx ON {table} (created_at);",
        ))
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            table: table.to_owned(),
            ttl,
            _values: PhantomData,
        })
    }

    fn cutoff(&self) -> Option<DateTime<Utc>> {
        if self.ttl.is_zero() {
            None
        } else {
            Some(Utc::now() - chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero()))
        }
    }

    /// Deletes rows older than the TTL. Returns the number of rows removed.
    pub async fn clean_expired(&self) -> Result<u64, CacheError> {
        let Some(cutoff) = self.cutoff() else {
            return Ok(0);
        };
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE created_at < $1;",
            self.table
        ))
        .bind(cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl<V> Cache<V> for PgCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<V> {
        let query = format!(
            "
            SELECT value FROM {}
            WHERE key = $1 AND ($2::timestamptz IS NULL OR created_at >= $2);
            ",
            self.table
        );
        let row: Result<Option<(serde_json::Value,)>, sqlx::Error> = sqlx::query_as(&query)
            .bind(key)
            .bind(self.cutoff())
            .fetch_optional(&self.pool)
            .await;

        match row {
            Ok(Some((value,))) => match serde_json::from_value(value) {
                Ok(value) => Some(value),
                Err(why) => {
                    log::warn!("cache entry for '{}' failed to decode: {}", key, why);
                    None
                }
            },
            Ok(None) => None,
            Err(why) => {
                log::warn!("cache read for '{}' failed: {}", key, why);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: V) {
        let value = match serde_json::to_value(&value) {
            Ok(value) => value,
            Err(why) => {
                log::warn!("cache entry for '{}' failed to encode: {}", key, why);
                return;
            }
        };
        let query = format!(
            "
            INSERT INTO {} (key, value, created_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, created_at = EXCLUDED.created_at;
            ",
            self.table
        );
        if let Err(why) = sqlx::query(&query).bind(key).bind(value).execute(&self.pool).await {
            log::warn!("cache write for '{}' failed: {}", key, why);
        }
    }
}
