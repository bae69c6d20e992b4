use crate::domains::core::row::{parse_date, parse_datetime, parse_optional_uuid, parse_uuid};
use crate::errors::DomainResult;
use crate::types::COMPLETED_STATUS;
use crate::validation::{sanitize_optional_text, sanitize_text, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status a fresh daily action starts in
pub const PENDING_STATUS: &str = "pending";

fn default_action_status() -> String {
    PENDING_STATUS.to_string()
}

/// Where a daily action sits in the hierarchy.
///
/// A task may carry both links; the priority link wins. Tree placement and
/// path lookup both go through [`DailyAction::parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionParent {
    Priority(Uuid),
    Goal(Uuid),
    Unlinked,
}

/// DailyAction entity - the smallest actionable unit (a "task")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default = "default_action_status")]
    pub status: String,
    #[serde(default)]
    pub priority_id: Option<Uuid>,
    #[serde(default)]
    pub goal_id: Option<Uuid>,
    #[serde(default)]
    pub is_daily_win: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyAction {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }

    pub fn parent(&self) -> ActionParent {
        match (self.priority_id, self.goal_id) {
            (Some(priority_id), _) => ActionParent::Priority(priority_id),
            (None, Some(goal_id)) => ActionParent::Goal(goal_id),
            (None, None) => ActionParent::Unlinked,
        }
    }

    /// Leaf progress: all or nothing
    pub fn progress(&self) -> u8 {
        if self.is_completed() {
            100
        } else {
            0
        }
    }
}

/// NewDailyAction DTO - used when creating a daily action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDailyAction {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub status: Option<String>,
    pub priority_id: Option<Uuid>,
    pub goal_id: Option<Uuid>,
    pub is_daily_win: Option<bool>,
}

impl NewDailyAction {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            date,
            status: None,
            priority_id: None,
            goal_id: None,
            is_daily_win: None,
        }
    }

    pub fn normalized(&self) -> NewDailyAction {
        NewDailyAction {
            title: sanitize_text(&self.title),
            description: sanitize_optional_text(self.description.as_deref()),
            status: Some(self.status.clone().unwrap_or_else(default_action_status)),
            is_daily_win: Some(self.is_daily_win.unwrap_or(false)),
            ..self.clone()
        }
    }
}

impl Validate for NewDailyAction {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("title", Some(sanitize_text(&self.title)))
            .not_blank()
            .max_length(200)
            .validate()?;

        if let Some(status) = &self.status {
            ValidationBuilder::new("status", Some(status.clone()))
                .not_blank()
                .max_length(50)
                .validate()?;
        }

        Ok(())
    }
}

/// DailyActionRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct DailyActionRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub status: String,
    pub priority_id: Option<String>,
    pub goal_id: Option<String>,
    pub is_daily_win: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl DailyActionRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<DailyAction> {
        Ok(DailyAction {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            title: self.title,
            description: self.description,
            date: parse_date(&self.date)?,
            status: self.status,
            priority_id: parse_optional_uuid(self.priority_id.as_deref())?,
            goal_id: parse_optional_uuid(self.goal_id.as_deref())?,
            is_daily_win: self.is_daily_win != 0,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}
