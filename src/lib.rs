// Public modules
pub mod auth;
pub mod config;
pub mod database;
pub mod domains;
pub mod errors;
pub mod notification;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

pub use auth::AuthContext;
pub use config::{init_logging, AppConfig};
pub use domains::traceability::{
    CommandOutcome, FetchSummary, TraceabilityCommand, TraceabilityNode, TraceabilityRepositories,
    TraceabilityStore,
};
pub use errors::{DomainError, ServiceError, ServiceResult};
pub use notification::{LogNotifier, Notification, Notifier};

use std::sync::Arc;

/// Store talking to the Supabase REST API described by `config`
pub fn remote_store(
    config: &AppConfig,
    auth: Option<AuthContext>,
    notifier: Arc<dyn Notifier>,
) -> ServiceResult<TraceabilityStore> {
    let client = Arc::new(domains::remote::PostgrestClient::from_config(config)?);
    Ok(
        TraceabilityStore::new(TraceabilityRepositories::remote(client), notifier, auth)
            .with_task_fetch_limit(config.task_fetch_limit),
    )
}

/// Store backed by a local SQLite database, migrated on open
pub async fn local_store(
    database_url: &str,
    auth: Option<AuthContext>,
    notifier: Arc<dyn Notifier>,
) -> ServiceResult<TraceabilityStore> {
    let pool = database::connect(database_url)
        .await
        .map_err(DomainError::from)?;
    Ok(TraceabilityStore::new(
        TraceabilityRepositories::sqlite(pool),
        notifier,
        auth,
    ))
}

/// Local store when a database URL is configured, the remote one otherwise
pub async fn store_from_config(
    config: &AppConfig,
    auth: Option<AuthContext>,
    notifier: Arc<dyn Notifier>,
) -> ServiceResult<TraceabilityStore> {
    match &config.database_url {
        Some(url) => Ok(local_store(url, auth, notifier)
            .await?
            .with_task_fetch_limit(config.task_fetch_limit)),
        None => remote_store(config, auth, notifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_local_store_opens_and_fetches() {
        let auth = AuthContext::new(Uuid::new_v4(), "token");
        let mut store = local_store("sqlite::memory:", Some(auth), Arc::new(LogNotifier))
            .await
            .unwrap();

        let summary = store.fetch_for_year(2025).await.unwrap();
        assert!(summary.is_complete());
        assert!(store.tree().is_none());
    }

    #[test]
    fn test_remote_store_from_config() {
        let config = AppConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some("https://project.supabase.co".to_string()),
            "SUPABASE_ANON_KEY" => Some("anon".to_string()),
            "MYRHYTHM_TASK_FETCH_LIMIT" => Some("25".to_string()),
            _ => None,
        })
        .unwrap();

        let store = remote_store(&config, None, Arc::new(LogNotifier)).unwrap();
        assert!(store.session().is_none());
        assert!(store.tree().is_none());
    }

    #[tokio::test]
    async fn test_store_from_config_prefers_local_database() {
        let config = AppConfig::from_lookup(|key| match key {
            "SUPABASE_URL" => Some("https://project.supabase.co".to_string()),
            "SUPABASE_ANON_KEY" => Some("anon".to_string()),
            "MYRHYTHM_DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => None,
        })
        .unwrap();
        let auth = AuthContext::new(Uuid::new_v4(), "token");

        let mut store = store_from_config(&config, Some(auth), Arc::new(LogNotifier))
            .await
            .unwrap();
        let summary = store.fetch_for_year(2025).await.unwrap();
        assert!(summary.is_complete());
    }
}
