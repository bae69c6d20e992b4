use uuid::Uuid;
use crate::errors::{ServiceError, ServiceResult};

/// Represents the authenticated session the store operates under
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The ID of the authenticated user; every remote row is scoped to it
    pub user_id: Uuid,

    /// Access token forwarded to the remote store as a bearer token
    pub access_token: String,
}

impl AuthContext {
    /// Create a new authentication context
    pub fn new(user_id: Uuid, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: access_token.into(),
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Require an active session, returning an error if there is none
    pub fn require(session: Option<&AuthContext>) -> ServiceResult<&AuthContext> {
        session.ok_or_else(|| {
            ServiceError::Authentication("No authenticated user for this session".to_string())
        })
    }
}
