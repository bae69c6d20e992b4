use crate::auth::AuthContext;
use crate::domains::goal::types::{Goal, GoalRow, NewGoal};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, SqlitePool};
use uuid::Uuid;

/// Trait defining goal repository operations
#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<Goal>>;

    async fn create(&self, new_goal: &NewGoal, auth: &AuthContext) -> DomainResult<Goal>;

    /// Point the goal at a vision, or detach it with `None`
    async fn update_vision_link(
        &self,
        goal_id: Uuid,
        vision_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()>;

    async fn update_progress(&self, goal_id: Uuid, progress: u8, auth: &AuthContext) -> DomainResult<()>;
}

/// SQLite implementation for GoalRepository
#[derive(Debug, Clone)]
pub struct SqliteGoalRepository {
    pool: SqlitePool,
}

impl SqliteGoalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: GoalRow) -> DomainResult<Goal> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    async fn find_by_id(&self, id: Uuid, auth: &AuthContext) -> DomainResult<Goal> {
        let row = query_as::<_, GoalRow>("SELECT * FROM goals WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(auth.user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Goal".to_string(), id))?;

        Self::map_row_to_entity(row)
    }
}

#[async_trait]
impl GoalRepository for SqliteGoalRepository {
    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<Goal>> {
        let rows = query_as::<_, GoalRow>(
            "SELECT * FROM goals WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(auth.user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter()
            .map(Self::map_row_to_entity)
            .collect::<DomainResult<Vec<Goal>>>()
    }

    async fn create(&self, new_goal: &NewGoal, auth: &AuthContext) -> DomainResult<Goal> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let goal = new_goal.normalized();

        query(
            r#"
            INSERT INTO goals (
                id, user_id, title, description, category, status,
                progress_percentage, target_date, annual_priority_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(&goal.category)
        .bind(&goal.status)
        .bind(goal.progress_percentage)
        .bind(goal.target_date.map(crate::domains::core::row::format_date))
        .bind(goal.annual_priority_id.map(|id| id.to_string()))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id, auth).await
    }

    async fn update_vision_link(
        &self,
        goal_id: Uuid,
        vision_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        let result = query(
            "UPDATE goals SET annual_priority_id = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(vision_id.map(|id| id.to_string()))
        .bind(Utc::now().to_rfc3339())
        .bind(goal_id.to_string())
        .bind(auth.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Goal".to_string(), goal_id));
        }
        Ok(())
    }

    async fn update_progress(&self, goal_id: Uuid, progress: u8, auth: &AuthContext) -> DomainResult<()> {
        let result = query(
            "UPDATE goals SET progress_percentage = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(progress.min(100) as i64)
        .bind(Utc::now().to_rfc3339())
        .bind(goal_id.to_string())
        .bind(auth.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Goal".to_string(), goal_id));
        }
        Ok(())
    }
}
