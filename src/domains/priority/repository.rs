use crate::auth::AuthContext;
use crate::domains::core::row::format_date;
use crate::domains::priority::types::{NewPriority, Priority, PriorityRow, UpdatePriority};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining priority repository operations
#[async_trait]
pub trait PriorityRepository: Send + Sync {
    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<Priority>>;

    async fn create(&self, new_priority: &NewPriority, auth: &AuthContext) -> DomainResult<Priority>;

    /// Patch a priority and return the row as stored
    async fn update(
        &self,
        id: Uuid,
        update: &UpdatePriority,
        auth: &AuthContext,
    ) -> DomainResult<Priority>;

    async fn delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()>;

    async fn update_goal_link(
        &self,
        id: Uuid,
        goal_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()>;
}

/// SQLite implementation for PriorityRepository
#[derive(Debug, Clone)]
pub struct SqlitePriorityRepository {
    pool: SqlitePool,
}

impl SqlitePriorityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: PriorityRow) -> DomainResult<Priority> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Priority> {
        let row = query_as::<_, PriorityRow>("SELECT * FROM priorities WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(auth.user_id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound("Priority".to_string(), id))?;

        Self::map_row_to_entity(row)
    }

    async fn update_with_tx<'t>(
        &self,
        id: Uuid,
        update: &UpdatePriority,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<Priority> {
        let mut priority = self.find_by_id_with_tx(id, auth, tx).await?;
        priority.apply_update(update);
        priority.validate_locator()?;
        priority.updated_at = Utc::now();

        query(
            r#"
            UPDATE priorities SET
                scope = ?, priority_number = ?, title = ?, description = ?,
                goal_id = ?, date = ?, week_number = ?, month = ?, year = ?,
                status = ?, is_shareable = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(priority.scope.as_str())
        .bind(priority.priority_number as i64)
        .bind(&priority.title)
        .bind(&priority.description)
        .bind(priority.goal_id.map(|id| id.to_string()))
        .bind(priority.date.map(format_date))
        .bind(priority.week_number.map(i64::from))
        .bind(priority.month.map(i64::from))
        .bind(priority.year as i64)
        .bind(priority.status.as_str())
        .bind(priority.is_shareable as i64)
        .bind(priority.updated_at.to_rfc3339())
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        self.find_by_id_with_tx(id, auth, tx).await
    }
}

#[async_trait]
impl PriorityRepository for SqlitePriorityRepository {
    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<Priority>> {
        let rows = query_as::<_, PriorityRow>(
            "SELECT * FROM priorities WHERE user_id = ? ORDER BY year DESC, priority_number ASC",
        )
        .bind(auth.user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        rows.into_iter()
            .map(Self::map_row_to_entity)
            .collect::<DomainResult<Vec<Priority>>>()
    }

    async fn create(&self, new_priority: &NewPriority, auth: &AuthContext) -> DomainResult<Priority> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let priority = new_priority.normalized();

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        query(
            r#"
            INSERT INTO priorities (
                id, user_id, scope, priority_number, title, description,
                goal_id, date, week_number, month, year, status, is_shareable,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .bind(priority.scope.as_str())
        .bind(priority.priority_number as i64)
        .bind(&priority.title)
        .bind(&priority.description)
        .bind(priority.goal_id.map(|id| id.to_string()))
        .bind(priority.date.map(format_date))
        .bind(priority.week_number.map(i64::from))
        .bind(priority.month.map(i64::from))
        .bind(priority.year as i64)
        .bind(priority.status.unwrap_or_default().as_str())
        .bind(priority.is_shareable.unwrap_or(false) as i64)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let created = self.find_by_id_with_tx(id, auth, &mut tx).await?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdatePriority,
        auth: &AuthContext,
    ) -> DomainResult<Priority> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let result = self.update_with_tx(id, update, auth, &mut tx).await;
        match result {
            Ok(priority) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(priority)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()> {
        let result = query("DELETE FROM priorities WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(auth.user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Priority".to_string(), id));
        }
        Ok(())
    }

    async fn update_goal_link(
        &self,
        id: Uuid,
        goal_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        let result = query(
            "UPDATE priorities SET goal_id = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(goal_id.map(|id| id.to_string()))
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound("Priority".to_string(), id));
        }
        Ok(())
    }
}
