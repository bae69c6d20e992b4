use crate::auth::AuthContext;
use crate::domains::sharing::types::{ShareRequest, SharedTraceabilityView, SharedViewRow};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::validation::normalize_email;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, SqlitePool};
use uuid::Uuid;

/// Trait defining shared view repository operations
#[async_trait]
pub trait SharedViewRepository: Send + Sync {
    /// Insert a share, or reactivate and retype the existing one for the same viewer
    async fn upsert_share(
        &self,
        request: &ShareRequest,
        auth: &AuthContext,
    ) -> DomainResult<SharedTraceabilityView>;

    /// Deactivate the share for `shared_with`; the row is kept
    async fn revoke_share(&self, shared_with: &str, auth: &AuthContext) -> DomainResult<()>;

    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<SharedTraceabilityView>>;
}

/// SQLite implementation for SharedViewRepository
#[derive(Debug, Clone)]
pub struct SqliteSharedViewRepository {
    pool: SqlitePool,
}

impl SqliteSharedViewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: SharedViewRow) -> DomainResult<SharedTraceabilityView> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }
}

#[async_trait]
impl SharedViewRepository for SqliteSharedViewRepository {
    async fn upsert_share(
        &self,
        request: &ShareRequest,
        auth: &AuthContext,
    ) -> DomainResult<SharedTraceabilityView> {
        let now = Utc::now().to_rfc3339();
        let viewer = request.normalized_viewer();

        let row = query_as::<_, SharedViewRow>(
            r#"
            INSERT INTO shared_traceability_views (
                id, user_id, shared_with, view_type, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT(user_id, shared_with) DO UPDATE SET
                view_type = excluded.view_type,
                is_active = 1,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(auth.user_id.to_string())
        .bind(&viewer)
        .bind(request.view_type.as_str())
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Self::map_row_to_entity(row)
    }

    async fn revoke_share(&self, shared_with: &str, auth: &AuthContext) -> DomainResult<()> {
        let viewer = normalize_email(shared_with);
        let result = query(
            "UPDATE shared_traceability_views SET is_active = 0, updated_at = ? WHERE user_id = ? AND shared_with = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(auth.user_id.to_string())
        .bind(&viewer)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Database(DbError::NotFound(
                "shared_traceability_views".to_string(),
                viewer,
            )));
        }
        Ok(())
    }

    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<SharedTraceabilityView>> {
        let rows = query_as::<_, SharedViewRow>(
            "SELECT * FROM shared_traceability_views WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(auth.user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter()
            .map(Self::map_row_to_entity)
            .collect::<DomainResult<Vec<SharedTraceabilityView>>>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;
    use crate::db_migration::run_migrations;
    use crate::types::ViewType;

    async fn repo() -> SqliteSharedViewRepository {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteSharedViewRepository::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_viewer() {
        let repo = repo().await;
        let auth = AuthContext::new(Uuid::new_v4(), "token");

        let first = repo
            .upsert_share(&ShareRequest::new("carer@example.com", ViewType::Full), &auth)
            .await
            .unwrap();
        let second = repo
            .upsert_share(&ShareRequest::new("Carer@Example.com", ViewType::GoalsOnly), &auth)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.view_type, ViewType::GoalsOnly);
        assert_eq!(repo.find_all_for_user(&auth).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_then_reshare() {
        let repo = repo().await;
        let auth = AuthContext::new(Uuid::new_v4(), "token");
        repo.upsert_share(&ShareRequest::new("friend@example.com", ViewType::PrioritiesOnly), &auth)
            .await
            .unwrap();

        repo.revoke_share("friend@example.com", &auth).await.unwrap();
        let shares = repo.find_all_for_user(&auth).await.unwrap();
        assert!(!shares[0].is_active);

        let reshared = repo
            .upsert_share(&ShareRequest::new("friend@example.com", ViewType::Full), &auth)
            .await
            .unwrap();
        assert!(reshared.is_active);

        assert!(repo.revoke_share("nobody@example.com", &auth).await.is_err());
    }
}
