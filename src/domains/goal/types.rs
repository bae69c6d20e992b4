use crate::domains::core::row::{parse_datetime, parse_optional_date, parse_optional_uuid, parse_uuid};
use crate::domains::vision::Vision;
use crate::errors::DomainResult;
use crate::types::{clamp_progress, deserialize_progress, COMPLETED_STATUS};
use crate::validation::{sanitize_optional_text, sanitize_text, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status values the goal forms produce
pub const GOAL_STATUSES: &[&str] = &[
    "not_started",
    "active",
    "in_progress",
    "paused",
    "completed",
    "archived",
];

fn default_goal_status() -> String {
    "active".to_string()
}

/// Goal entity - a mid-term objective, optionally tied to the year's vision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_goal_status")]
    pub status: String,
    /// Authoritative progress, always within 0..=100
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress_percentage: u8,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// Link to the vision (`annual_priorities.id`)
    #[serde(default)]
    pub annual_priority_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }

    pub fn is_linked_to(&self, vision: &Vision) -> bool {
        self.annual_priority_id == Some(vision.id)
    }
}

/// NewGoal DTO - used when creating a goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub progress_percentage: Option<i64>,
    pub target_date: Option<NaiveDate>,
    pub annual_priority_id: Option<Uuid>,
}

impl NewGoal {
    /// Sanitized copy with progress clamped, ready to be written
    pub fn normalized(&self) -> NewGoal {
        NewGoal {
            title: sanitize_text(&self.title),
            description: sanitize_optional_text(self.description.as_deref()),
            category: sanitize_optional_text(self.category.as_deref()),
            status: Some(self.status.clone().unwrap_or_else(default_goal_status)),
            progress_percentage: Some(clamp_progress(self.progress_percentage.unwrap_or(0) as f64) as i64),
            target_date: self.target_date,
            annual_priority_id: self.annual_priority_id,
        }
    }
}

impl Validate for NewGoal {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("title", Some(sanitize_text(&self.title)))
            .not_blank()
            .max_length(200)
            .validate()?;

        if let Some(status) = &self.status {
            ValidationBuilder::new("status", Some(status.clone()))
                .one_of(GOAL_STATUSES, None)
                .validate()?;
        }

        Ok(())
    }
}

/// GoalRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct GoalRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub progress_percentage: i64,
    pub target_date: Option<String>,
    pub annual_priority_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl GoalRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Goal> {
        Ok(Goal {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            title: self.title,
            description: self.description,
            category: self.category,
            status: self.status,
            progress_percentage: clamp_progress(self.progress_percentage as f64),
            target_date: parse_optional_date(self.target_date.as_deref())?,
            annual_priority_id: parse_optional_uuid(self.annual_priority_id.as_deref())?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}
