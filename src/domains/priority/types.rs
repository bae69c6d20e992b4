use crate::domains::core::row::{
    parse_datetime, parse_enum, parse_optional_date, parse_optional_u32, parse_optional_uuid,
    parse_uuid,
};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::types::{deserialize_some, PriorityScope, PriorityStatus};
use crate::validation::{sanitize_optional_text, sanitize_text, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Priority entity - a scoped focus item, optionally tied to a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scope: PriorityScope,
    pub priority_number: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goal_id: Option<Uuid>,
    /// Locator for daily priorities
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// ISO-8601 week, for weekly priorities
    #[serde(default)]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub month: Option<u32>,
    pub year: i32,
    #[serde(default)]
    pub status: PriorityStatus,
    #[serde(default)]
    pub is_shareable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Priority {
    pub fn is_completed(&self) -> bool {
        self.status == PriorityStatus::Completed
    }

    /// Apply a patch to the in-memory copy, the same way the remote row changes
    pub fn apply_update(&mut self, update: &UpdatePriority) {
        if let Some(scope) = update.scope {
            self.scope = scope;
        }
        if let Some(number) = update.priority_number {
            self.priority_number = number;
        }
        if let Some(title) = &update.title {
            self.title = sanitize_text(title);
        }
        if let Some(description) = &update.description {
            self.description = sanitize_optional_text(description.as_deref());
        }
        if let Some(goal_id) = update.goal_id {
            self.goal_id = goal_id;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(week) = update.week_number {
            self.week_number = week;
        }
        if let Some(month) = update.month {
            self.month = month;
        }
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(shareable) = update.is_shareable {
            self.is_shareable = shareable;
        }
    }

    /// The scope's locator must be set for the priority to be findable by scope
    pub fn validate_locator(&self) -> DomainResult<()> {
        validate_locator(self.scope, self.date, self.week_number, self.month, self.year)
    }
}

/// NewPriority DTO - used when creating a priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPriority {
    pub scope: PriorityScope,
    pub priority_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub goal_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub week_number: Option<u32>,
    pub month: Option<u32>,
    pub year: i32,
    pub status: Option<PriorityStatus>,
    pub is_shareable: Option<bool>,
}

impl NewPriority {
    /// A priority for one of the scopes, with no locator beyond the year
    pub fn new(scope: PriorityScope, priority_number: i32, title: impl Into<String>, year: i32) -> Self {
        Self {
            scope,
            priority_number,
            title: title.into(),
            description: None,
            goal_id: None,
            date: None,
            week_number: None,
            month: None,
            year,
            status: None,
            is_shareable: None,
        }
    }

    /// Sanitized copy with defaults filled in, ready to be written
    pub fn normalized(&self) -> NewPriority {
        NewPriority {
            title: sanitize_text(&self.title),
            description: sanitize_optional_text(self.description.as_deref()),
            status: Some(self.status.unwrap_or_default()),
            is_shareable: Some(self.is_shareable.unwrap_or(false)),
            ..self.clone()
        }
    }
}

impl Validate for NewPriority {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("title", Some(sanitize_text(&self.title)))
            .not_blank()
            .max_length(200)
            .validate()?;

        ValidationBuilder::new("priority_number", Some(self.priority_number))
            .min(1)
            .validate()?;

        validate_locator(self.scope, self.date, self.week_number, self.month, self.year)
    }
}

/// Shared locator rules: the scope decides which locator field must be present
fn validate_locator(
    scope: PriorityScope,
    date: Option<NaiveDate>,
    week_number: Option<u32>,
    month: Option<u32>,
    year: i32,
) -> DomainResult<()> {
    ValidationBuilder::new("year", Some(year)).range(2000, 2100).validate()?;
    ValidationBuilder::new("week_number", week_number).range(1, 53).validate()?;
    ValidationBuilder::new("month", month).range(1, 12).validate()?;

    let missing = match scope {
        PriorityScope::Daily if date.is_none() => Some("date"),
        PriorityScope::Weekly if week_number.is_none() => Some("week_number"),
        PriorityScope::Monthly if month.is_none() => Some("month"),
        _ => None,
    };
    if let Some(field) = missing {
        return Err(DomainError::Validation(ValidationError::required(field)));
    }
    Ok(())
}

/// UpdatePriority DTO - fields left as `None` are not touched.
///
/// Nullable columns use `Option<Option<T>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePriority {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<PriorityScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub week_number: Option<Option<u32>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub month: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PriorityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_shareable: Option<bool>,
}

impl UpdatePriority {
    pub fn is_empty(&self) -> bool {
        self.scope.is_none()
            && self.priority_number.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.goal_id.is_none()
            && self.date.is_none()
            && self.week_number.is_none()
            && self.month.is_none()
            && self.year.is_none()
            && self.status.is_none()
            && self.is_shareable.is_none()
    }

    /// Check the patch against the stored priority it lands on
    pub fn validate_against(&self, current: &Priority) -> DomainResult<()> {
        let mut merged = current.clone();
        merged.apply_update(self);
        merged.validate_locator()
    }

    /// Sanitized copy; blank descriptions become a clear
    pub fn normalized(&self) -> UpdatePriority {
        UpdatePriority {
            title: self.title.as_deref().map(sanitize_text),
            description: self
                .description
                .as_ref()
                .map(|d| sanitize_optional_text(d.as_deref())),
            ..self.clone()
        }
    }
}

impl Validate for UpdatePriority {
    fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::Validation(ValidationError::invalid_value(
                "update",
                "at least one field must be changed",
            )));
        }

        if let Some(title) = &self.title {
            ValidationBuilder::new("title", Some(sanitize_text(title)))
                .not_blank()
                .max_length(200)
                .validate()?;
        }

        ValidationBuilder::new("priority_number", self.priority_number)
            .min(1)
            .validate()?;
        ValidationBuilder::new("year", self.year).range(2000, 2100).validate()?;
        ValidationBuilder::new("week_number", self.week_number.flatten())
            .range(1, 53)
            .validate()?;
        ValidationBuilder::new("month", self.month.flatten())
            .range(1, 12)
            .validate()?;

        // a scope change carries its own locator
        let missing = match self.scope {
            Some(PriorityScope::Daily) if self.date.flatten().is_none() => Some("date"),
            Some(PriorityScope::Weekly) if self.week_number.flatten().is_none() => Some("week_number"),
            Some(PriorityScope::Monthly) if self.month.flatten().is_none() => Some("month"),
            _ => None,
        };
        match missing {
            Some(field) => Err(DomainError::Validation(ValidationError::required(field))),
            None => Ok(()),
        }
    }
}

/// PriorityRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct PriorityRow {
    pub id: String,
    pub user_id: String,
    pub scope: String,
    pub priority_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub goal_id: Option<String>,
    pub date: Option<String>,
    pub week_number: Option<i64>,
    pub month: Option<i64>,
    pub year: i64,
    pub status: String,
    pub is_shareable: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PriorityRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Priority> {
        Ok(Priority {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            scope: parse_enum("scope", &self.scope)?,
            priority_number: self.priority_number as i32,
            title: self.title,
            description: self.description,
            goal_id: parse_optional_uuid(self.goal_id.as_deref())?,
            date: parse_optional_date(self.date.as_deref())?,
            week_number: parse_optional_u32("week_number", self.week_number)?,
            month: parse_optional_u32("month", self.month)?,
            year: self.year as i32,
            status: parse_enum("status", &self.status)?,
            is_shareable: self.is_shareable != 0,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}
