use crate::domains::core::row::{parse_datetime, parse_uuid};
use crate::errors::{DomainError, DomainResult};
use crate::validation::{sanitize_optional_text, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vision entity - the user's yearly aspiration (`annual_priorities` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vision {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    #[serde(default)]
    pub yearly_theme: Option<String>,
    #[serde(default)]
    pub vision_statement: Option<String>,
    #[serde(default)]
    pub priority_1: Option<String>,
    #[serde(default)]
    pub priority_2: Option<String>,
    #[serde(default)]
    pub priority_3: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vision {
    /// The filled priority slots, in slot order
    pub fn priority_slots(&self) -> Vec<&str> {
        [&self.priority_1, &self.priority_2, &self.priority_3]
            .into_iter()
            .filter_map(|slot| slot.as_deref())
            .filter(|slot| !slot.trim().is_empty())
            .collect()
    }

    /// Label used for the root of the traceability tree
    pub fn display_title(&self) -> String {
        match self.yearly_theme.as_deref().map(str::trim) {
            Some(theme) if !theme.is_empty() => theme.to_string(),
            _ => format!("{} Vision", self.year),
        }
    }
}

/// NewVision DTO - used when the user sets up their year
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVision {
    pub year: i32,
    pub yearly_theme: Option<String>,
    pub vision_statement: Option<String>,
    pub priority_1: Option<String>,
    pub priority_2: Option<String>,
    pub priority_3: Option<String>,
}

impl NewVision {
    /// Sanitized copy, ready to be written
    pub fn normalized(&self) -> NewVision {
        NewVision {
            year: self.year,
            yearly_theme: sanitize_optional_text(self.yearly_theme.as_deref()),
            vision_statement: sanitize_optional_text(self.vision_statement.as_deref()),
            priority_1: sanitize_optional_text(self.priority_1.as_deref()),
            priority_2: sanitize_optional_text(self.priority_2.as_deref()),
            priority_3: sanitize_optional_text(self.priority_3.as_deref()),
        }
    }
}

impl Validate for NewVision {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("year", Some(self.year))
            .range(2000, 2100)
            .validate()?;

        if let Some(theme) = &self.yearly_theme {
            ValidationBuilder::new("yearly_theme", Some(theme.clone()))
                .max_length(200)
                .validate()?;
        }

        for (field, slot) in [
            ("priority_1", &self.priority_1),
            ("priority_2", &self.priority_2),
            ("priority_3", &self.priority_3),
        ] {
            if let Some(value) = slot {
                ValidationBuilder::new(field, Some(value.clone()))
                    .max_length(200)
                    .validate()?;
            }
        }

        Ok(())
    }
}

/// VisionRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct VisionRow {
    pub id: String,
    pub user_id: String,
    pub year: i64,
    pub yearly_theme: Option<String>,
    pub vision_statement: Option<String>,
    pub priority_1: Option<String>,
    pub priority_2: Option<String>,
    pub priority_3: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl VisionRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<Vision> {
        Ok(Vision {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            year: i32::try_from(self.year)
                .map_err(|_| DomainError::Internal(format!("Invalid year column: {}", self.year)))?,
            yearly_theme: self.yearly_theme,
            vision_statement: self.vision_statement,
            priority_1: self.priority_1,
            priority_2: self.priority_2,
            priority_3: self.priority_3,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}
