use crate::errors::{ServiceError, ServiceResult};
use std::time::Duration;

/// Default number of daily actions pulled on each fetch
pub const DEFAULT_TASK_FETCH_LIMIT: i64 = 100;

/// Default timeout for remote store requests
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration, read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Supabase project, e.g. `https://xyz.supabase.co`
    pub supabase_url: String,
    /// Public anon key sent as the `apikey` header
    pub supabase_anon_key: String,
    /// Optional SQLite database for a local store
    pub database_url: Option<String>,
    pub task_fetch_limit: i64,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Load `.env` (if any) and read the configuration from the process environment
    pub fn from_env() -> ServiceResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> ServiceResult<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ServiceError::Configuration(format!("{} is not set", key)))
        };

        let supabase_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            return Err(ServiceError::Configuration(format!(
                "SUPABASE_URL must be an http(s) URL, got {}",
                supabase_url
            )));
        }
        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;

        let database_url = lookup("MYRHYTHM_DATABASE_URL").filter(|v| !v.trim().is_empty());

        let task_fetch_limit = match lookup("MYRHYTHM_TASK_FETCH_LIMIT") {
            Some(raw) => raw.trim().parse::<i64>().ok().filter(|v| *v > 0).ok_or_else(|| {
                ServiceError::Configuration(format!(
                    "MYRHYTHM_TASK_FETCH_LIMIT must be a positive integer, got {}",
                    raw
                ))
            })?,
            None => DEFAULT_TASK_FETCH_LIMIT,
        };

        let http_timeout_secs = match lookup("MYRHYTHM_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ServiceError::Configuration(format!(
                    "MYRHYTHM_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {}",
                    raw
                ))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            database_url,
            task_fetch_limit,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

/// Initialise `env_logger`, defaulting `RUST_LOG` to `debug` in debug builds
/// and `info` otherwise. Calling it more than once is harmless.
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        #[cfg(debug_assertions)]
        let default_level = "debug";
        #[cfg(not(debug_assertions))]
        let default_level = "info";

        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(default_level),
        )
        .try_init();
    } else {
        let _ = env_logger::try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "https://project.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();

        assert_eq!(config.supabase_url, "https://project.supabase.co");
        assert_eq!(config.task_fetch_limit, DEFAULT_TASK_FETCH_LIMIT);
        assert_eq!(config.http_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_missing_required_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("SUPABASE_ANON_KEY", "anon")])).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(msg) if msg.contains("SUPABASE_URL")));

        let err = AppConfig::from_lookup(lookup_from(&[("SUPABASE_URL", "https://p.supabase.co")])).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(msg) if msg.contains("SUPABASE_ANON_KEY")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .is_err());

        assert!(AppConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "https://p.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("MYRHYTHM_TASK_FETCH_LIMIT", "0"),
        ]))
        .is_err());

        let config = AppConfig::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "https://p.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("MYRHYTHM_TASK_FETCH_LIMIT", "25"),
            ("MYRHYTHM_HTTP_TIMEOUT_SECS", "5"),
            ("MYRHYTHM_DATABASE_URL", "sqlite://myrhythm.db"),
        ]))
        .unwrap();
        assert_eq!(config.task_fetch_limit, 25);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.database_url.as_deref(), Some("sqlite://myrhythm.db"));
    }
}
