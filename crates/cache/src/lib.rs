use std::{error, fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

pub mod memory;
pub mod postgres;

pub use memory::MemoryCache;
pub use postgres::PgCache;

/// A typed key→value store with a uniform TTL. Lookups and writes are
/// best-effort: a failing backend behaves like a miss and is logged by the
/// implementation, it never fails the caller.
#[async_trait]
pub trait Cache<V>: Send + Sync {
    async fn get(&self, key: &str) -> Option<V>;
    async fn put(&self, key: &str, value: V);
}

#[derive(Debug)]
pub enum CacheError {
    InvalidConfig(String),
    Database(sqlx::Error),
}

impl error::Error for CacheError {}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CacheError::InvalidConfig(what) => write!(f, "invalid cache config: {}", what),
            CacheError::Database(why) => write!(f, "cache database error: {}", why),
        }
    }
}

impl From<sqlx::Error> for CacheError {
    fn from(why: sqlx::Error) -> Self {
        CacheError::Database(why)
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enable: bool,
    pub ttl_ms: u64,
    pub backend: CacheBackend,
}

#[derive(Debug, Clone)]
pub enum CacheBackend {
    Memory { capacity: usize },
    Postgres { uri: String, table: String },
}

/// Builds the configured backend. `enable = false` yields no cache at all;
/// every lookup then misses and nothing is written.
///
/// The Postgres backend has no server-side TTL, so a sweep task is spawned
/// alongside it that periodically deletes expired rows.
pub async fn connect<V>(
    settings: &CacheSettings,
) -> Result<Option<Arc<dyn Cache<V>>>, CacheError>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    if !settings.enable {
        return Ok(None);
    }

    let ttl = Duration::from_millis(settings.ttl_ms);
    match &settings.backend {
        CacheBackend::Memory { capacity } => {
            let cache = MemoryCache::new(*capacity, ttl)?;
            Ok(Some(Arc::new(cache)))
        }
        CacheBackend::Postgres { uri, table } => {
            let cache = Arc::new(PgCache::<V>::connect(uri, table, ttl).await?);
            if !ttl.is_zero() {
                let sweeper = cache.clone();
                let period = ttl.max(Duration::from_secs(60));
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(period);
                    loop {
                        interval.tick().await;
                        if let Err(why) = sweeper.clean_expired().await {
                            log::warn!("cache sweep failed: {}", why);
                        }
                    }
                });
            }
            Ok(Some(cache))
        }
    }
}
