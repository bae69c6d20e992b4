use crate::domains::core::row::{parse_datetime, parse_enum, parse_uuid};
use crate::errors::DomainResult;
use crate::types::ViewType;
use crate::validation::{normalize_email, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A read-only view of the owner's hierarchy granted to one viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedTraceabilityView {
    pub id: Uuid,
    /// The owner of the shared hierarchy
    pub user_id: Uuid,
    pub shared_with: String,
    #[serde(default)]
    pub view_type: ViewType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// ShareRequest DTO - grant (or re-grant) a view to a viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRequest {
    pub shared_with: String,
    #[serde(default)]
    pub view_type: ViewType,
}

impl ShareRequest {
    pub fn new(shared_with: impl Into<String>, view_type: ViewType) -> Self {
        Self {
            shared_with: shared_with.into(),
            view_type,
        }
    }

    /// Viewer identifier as stored: trimmed and lower-cased
    pub fn normalized_viewer(&self) -> String {
        normalize_email(&self.shared_with)
    }
}

impl Validate for ShareRequest {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("shared_with", Some(self.normalized_viewer()))
            .not_blank()
            .max_length(254)
            .email()
            .validate()
    }
}

/// SharedViewRow - SQLite row representation
#[derive(Debug, Clone, FromRow)]
pub struct SharedViewRow {
    pub id: String,
    pub user_id: String,
    pub shared_with: String,
    pub view_type: String,
    pub is_active: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl SharedViewRow {
    pub fn into_entity(self) -> DomainResult<SharedTraceabilityView> {
        Ok(SharedTraceabilityView {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            shared_with: self.shared_with,
            view_type: parse_enum("view_type", &self.view_type)?,
            is_active: self.is_active != 0,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}
