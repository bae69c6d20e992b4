use crate::auth::AuthContext;
use crate::domains::vision::types::{NewVision, Vision, VisionRow};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, SqlitePool};
use uuid::Uuid;

/// Trait defining vision repository operations
#[async_trait]
pub trait VisionRepository: Send + Sync {
    /// The user's vision for `year`, if they have set one up
    async fn find_for_year(&self, year: i32, auth: &AuthContext) -> DomainResult<Option<Vision>>;

    async fn create(&self, new_vision: &NewVision, auth: &AuthContext) -> DomainResult<Vision>;
}

/// SQLite implementation for VisionRepository
#[derive(Debug, Clone)]
pub struct SqliteVisionRepository {
    pool: SqlitePool,
}

impl SqliteVisionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row_to_entity(row: VisionRow) -> DomainResult<Vision> {
        row.into_entity()
            .map_err(|e| DomainError::Internal(format!("Failed to map row to entity: {}", e)))
    }

    async fn find_by_id(&self, id: Uuid, auth: &AuthContext) -> DomainResult<Vision> {
        let row = query_as::<_, VisionRow>(
            "SELECT * FROM annual_priorities WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| DomainError::EntityNotFound("Vision".to_string(), id))?;

        Self::map_row_to_entity(row)
    }
}

#[async_trait]
impl VisionRepository for SqliteVisionRepository {
    async fn find_for_year(&self, year: i32, auth: &AuthContext) -> DomainResult<Option<Vision>> {
        let row = query_as::<_, VisionRow>(
            "SELECT * FROM annual_priorities WHERE user_id = ? AND year = ? LIMIT 1",
        )
        .bind(auth.user_id.to_string())
        .bind(year as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        row.map(Self::map_row_to_entity).transpose()
    }

    async fn create(&self, new_vision: &NewVision, auth: &AuthContext) -> DomainResult<Vision> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let vision = new_vision.normalized();

        query(
            r#"
            INSERT INTO annual_priorities (
                id, user_id, year, yearly_theme, vision_statement,
                priority_1, priority_2, priority_3, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(auth.user_id.to_string())
        .bind(vision.year as i64)
        .bind(&vision.yearly_theme)
        .bind(&vision.vision_statement)
        .bind(&vision.priority_1)
        .bind(&vision.priority_2)
        .bind(&vision.priority_3)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id, auth).await
    }
}
