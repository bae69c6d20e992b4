use crate::auth::AuthContext;
use crate::domains::core::row::format_date;
use crate::domains::daily_action::types::{DailyAction, DailyActionRow, NewDailyAction};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, SqlitePool};
use uuid::Uuid;

/// Trait defining daily action repository operations
#[async_trait]
pub trait DailyActionRepository: Send + Sync {
    /// Most recent actions first, at most `limit` of them
    async fn find_recent_for_user(&self, limit: i64, auth: &AuthContext) -> DomainResult<Vec<DailyAction>>;

    async fn create(&self, new_action: &NewDailyAction, auth: &AuthContext) -> DomainResult<DailyAction>;

    async fn update_priority_link(
        &self,
        id: Uuid,
        priority_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()>;

    async fn update_goal_link(
        &self,
        id: Uuid,
        goal_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()>;

    async fn update_status(&self, id: Uuid, status: &str, auth: &AuthContext) -> DomainResult<()>;
}

/// SQLite implementation for DailyActionRepository
#[derive(Debug, Clone)]
pub struct SqliteDailyActionRepository {
    pool: SqlitePool,
}

impl SqliteDailyActionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: DailyActionRow) -> DomainResult<DailyAction> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    async fn find_by_id(&self, id: Uuid, auth: &AuthContext) -> DomainResult<DailyAction> {
        let row = query_as::<_, DailyActionRow>(
            "SELECT * FROM daily_actions WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("DailyAction".to_string(), id))?;

        Self::map_row_to_entity(row)
    }

    /// Set one nullable column; `column` is always one of our literals
    async fn update_column(
        &self,
        id: Uuid,
        column: &'static str,
        value: Option<String>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        let sql = format!(
            "UPDATE daily_actions SET {} = ?, updated_at = ? WHERE id = ? AND user_id = ?",
            column
        );
        let result = query(&sql)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .bind(auth.user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("DailyAction".to_string(), id));
        }
        Ok(())
    }
}

#[async_trait]
impl DailyActionRepository for SqliteDailyActionRepository {
    async fn find_recent_for_user(&self, limit: i64, auth: &AuthContext) -> DomainResult<Vec<DailyAction>> {
        let rows = query_as::<_, DailyActionRow>(
            "SELECT * FROM daily_actions WHERE user_id = ? ORDER BY date DESC, created_at DESC LIMIT ?",
        )
        .bind(auth.user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter()
            .map(Self::map_row_to_entity)
            .collect::<DomainResult<Vec<DailyAction>>>()
    }

    async fn create(&self, new_action: &NewDailyAction, auth: &AuthContext) -> DomainResult<DailyAction> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let action = new_action.normalized();

        query(
            r#"
            INSERT INTO daily_actions (
                id, user_id, title, description, date, status,
                priority_id, goal_id, is_daily_win, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .bind(&action.title)
        .bind(&action.description)
        .bind(format_date(action.date))
        .bind(&action.status)
        .bind(action.priority_id.map(|id| id.to_string()))
        .bind(action.goal_id.map(|id| id.to_string()))
        .bind(action.is_daily_win.unwrap_or(false) as i64)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id, auth).await
    }

    async fn update_priority_link(
        &self,
        id: Uuid,
        priority_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        self.update_column(id, "priority_id", priority_id.map(|p| p.to_string()), auth)
            .await
    }

    async fn update_goal_link(
        &self,
        id: Uuid,
        goal_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        self.update_column(id, "goal_id", goal_id.map(|g| g.to_string()), auth)
            .await
    }

    async fn update_status(&self, id: Uuid, status: &str, auth: &AuthContext) -> DomainResult<()> {
        self.update_column(id, "status", Some(status.to_string()), auth)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;
    use crate::db_migration::run_migrations;
    use crate::types::COMPLETED_STATUS;
    use chrono::NaiveDate;

    async fn repo() -> SqliteDailyActionRepository {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteDailyActionRepository::new(pool)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_recent_actions_are_limited_and_ordered() {
        let repo = repo().await;
        let auth = AuthContext::new(Uuid::new_v4(), "token");
        for d in 1..=5 {
            repo.create(&NewDailyAction::new(format!("Walk {}", d), day(d)), &auth)
                .await
                .unwrap();
        }

        let recent = repo.find_recent_for_user(3, &auth).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].date, day(5));
        assert_eq!(recent[2].date, day(3));
    }

    #[tokio::test]
    async fn test_status_and_links() {
        let repo = repo().await;
        let auth = AuthContext::new(Uuid::new_v4(), "token");
        let action = repo.create(&NewDailyAction::new("Walk", day(6)), &auth).await.unwrap();
        assert!(!action.is_completed());

        repo.update_status(action.id, COMPLETED_STATUS, &auth).await.unwrap();
        let stored = repo.find_by_id(action.id, &auth).await.unwrap();
        assert!(stored.is_completed());

        // links are foreign keys; clearing always succeeds, dangling ids do not
        repo.update_priority_link(action.id, None, &auth).await.unwrap();
        assert!(repo.update_goal_link(action.id, Some(Uuid::new_v4()), &auth).await.is_err());

        let missing = Uuid::new_v4();
        assert!(matches!(
            repo.update_status(missing, COMPLETED_STATUS, &auth).await,
            Err(DomainError::EntityNotFound(_, id)) if id == missing
        ));
    }
}
