use std::{env, error, fmt, time::Duration};

use cache::{CacheBackend, CacheSettings};
use scheduler::SchedulingDefaults;
use taskqueue::DispatcherSettings;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "missing environment variable {}", var),
            ConfigError::Invalid(var, value) => {
                write!(f, "invalid value '{}' for environment variable {}", value, var)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskStoreSettings {
    pub uri: String,
    pub table: String,
    pub ttl_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub debug_mode: bool,
    pub port: u16,
    pub enable_origin_check: bool,
    pub acceptable_origins: Vec<String>,
    pub google_api_token: String,
    pub defaults: SchedulingDefaults,
    pub cache: CacheSettings,
    pub task: TaskStoreSettings,
    pub processor: DispatcherSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Reads the configuration through a lookup closure so tests can feed a
    /// plain map instead of mutating the process environment.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug_mode = bool_var(&lookup, "DEBUG_MODE", false)?;
        let port = parse_var(&lookup, "PORT", 8080u16)?;

        let enable_origin_check = bool_var(&lookup, "ENABLE_ORIGIN_CHECK", false)?;
        let acceptable_origins = lookup("ACCEPTABLE_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_owned())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let google_api_token =
            lookup("GOOGLE_API_TOKEN").ok_or(ConfigError::Missing("GOOGLE_API_TOKEN"))?;

        // the DEFAULT_* group is stored in milliseconds, consumed in seconds
        let defaults = SchedulingDefaults {
            before_pickup_secs: parse_var(&lookup, "DEFAULT_BEFORE_PICKUP_TIME", 600_000i64)? / 1000,
            after_pickup_secs: parse_var(&lookup, "DEFAULT_AFTER_PICKUP_TIME", 1_800_000i64)? / 1000,
            dropoff_unloading_secs: parse_var(&lookup, "DEFAULT_DROPOFF_UNLOADING_TIME", 300_000i64)?
                / 1000,
            debug: debug_mode,
        };

        let cache = Self::cache_settings(&lookup)?;

        let task = TaskStoreSettings {
            uri: lookup("TASK_PG_URI").ok_or(ConfigError::Missing("TASK_PG_URI"))?,
            table: lookup("TASK_PG_TABLE").unwrap_or_else(|| "scheduling_tasks".to_owned()),
            ttl_ms: parse_var(&lookup, "TASK_TTL", 86_400_000u64)?,
        };

        let processor = DispatcherSettings {
            interval: Duration::from_millis(parse_var(&lookup, "PROCESSOR_INTERVAL", 10_000u64)?),
            batch_size: parse_var(&lookup, "PROCESSOR_BATCH_SIZE", 10usize)?,
            workers: parse_var(&lookup, "PROCESSOR_THREAD_NUMBER", 4usize)?,
        };

        Ok(Self {
            debug_mode,
            port,
            enable_origin_check,
            acceptable_origins,
            google_api_token,
            defaults,
            cache,
            task,
            processor,
        })
    }

    fn cache_settings<F>(lookup: &F) -> Result<CacheSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enable = bool_var(lookup, "ENABLE_CACHE", true)?;
        let ttl_ms = parse_var(lookup, "CACHE_TTL", 3_600_000u64)?;
        let backend = match lookup("CACHE_TYPE").as_deref().unwrap_or("memory") {
            "memory" => CacheBackend::Memory {
                capacity: parse_var(lookup, "CACHE_MEM_CAPACITY", 1024usize)?,
            },
            "postgres" => CacheBackend::Postgres {
                uri: lookup("CACHE_PG_URI").ok_or(ConfigError::Missing("CACHE_PG_URI"))?,
                table: lookup("CACHE_PG_TABLE").unwrap_or_else(|| "directions_cache".to_owned()),
            },
            other => return Err(ConfigError::Invalid("CACHE_TYPE", other.to_owned())),
        };
        Ok(CacheSettings {
            enable,
            ttl_ms,
            backend,
        })
    }
}

fn bool_var<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid(name, value)),
        },
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(entries: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = Config::from_vars(vars(&[
            ("GOOGLE_API_TOKEN", "token"),
            ("TASK_PG_URI", "postgres://localhost/tasks"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(!config.enable_origin_check);
        assert_eq!(config.defaults.before_pickup_secs, 600);
        assert_eq!(config.defaults.after_pickup_secs, 1800);
        assert_eq!(config.defaults.dropoff_unloading_secs, 300);
        assert_eq!(config.task.table, "scheduling_tasks");
        assert_eq!(config.processor.batch_size, 10);
        assert!(matches!(config.cache.backend, CacheBackend::Memory { capacity: 1024 }));
    }

    #[test]
    fn default_times_convert_milliseconds_to_seconds() {
        let config = Config::from_vars(vars(&[
            ("GOOGLE_API_TOKEN", "token"),
            ("TASK_PG_URI", "postgres://localhost/tasks"),
            ("DEFAULT_BEFORE_PICKUP_TIME", "300000"),
            ("DEFAULT_AFTER_PICKUP_TIME", "900000"),
            ("DEFAULT_DROPOFF_UNLOADING_TIME", "120000"),
        ]))
        .unwrap();
        assert_eq!(config.defaults.before_pickup_secs, 300);
        assert_eq!(config.defaults.after_pickup_secs, 900);
        assert_eq!(config.defaults.dropoff_unloading_secs, 120);
    }

    #[test]
    fn origins_split_on_commas() {
        let config = Config::from_vars(vars(&[
            ("GOOGLE_API_TOKEN", "token"),
            ("TASK_PG_URI", "postgres://localhost/tasks"),
            ("ENABLE_ORIGIN_CHECK", "true"),
            ("ACCEPTABLE_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();
        assert!(config.enable_origin_check);
        assert_eq!(
            config.acceptable_origins,
            vec!["https://a.example".to_owned(), "https://b.example".to_owned()]
        );
    }

    #[test]
    fn postgres_cache_requires_a_uri() {
        let result = Config::from_vars(vars(&[
            ("GOOGLE_API_TOKEN", "token"),
            ("TASK_PG_URI", "postgres://localhost/tasks"),
            ("CACHE_TYPE", "postgres"),
        ]));
        assert!(matches!(result, Err(ConfigError::Missing("CACHE_PG_URI"))));
    }

    #[test]
    fn unknown_cache_type_is_rejected() {
        let result = Config::from_vars(vars(&[
            ("GOOGLE_API_TOKEN", "token"),
            ("TASK_PG_URI", "postgres://localhost/tasks"),
            ("CACHE_TYPE", "redis"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid("CACHE_TYPE", _))));
    }

    #[test]
    fn missing_token_is_an_error() {
        let result = Config::from_vars(vars(&[("TASK_PG_URI", "postgres://localhost/tasks")]));
        assert!(matches!(result, Err(ConfigError::Missing("GOOGLE_API_TOKEN"))));
    }
}
