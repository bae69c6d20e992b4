use crate::auth::AuthContext;
use crate::domains::daily_action::{DailyAction, DailyActionRepository, NewDailyAction};
use crate::domains::goal::{Goal, GoalRepository, NewGoal};
use crate::domains::priority::{NewPriority, Priority, PriorityRepository, UpdatePriority};
use crate::domains::remote::client::{eq, owned_by, row_of, Filter, PostgrestClient};
use crate::domains::sharing::{ShareRequest, SharedTraceabilityView, SharedViewRepository};
use crate::domains::vision::{NewVision, Vision, VisionRepository};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::ViewType;
use crate::validation::normalize_email;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const VISIONS: &str = "annual_priorities";
const GOALS: &str = "goals";
const PRIORITIES: &str = "priorities";
const DAILY_ACTIONS: &str = "daily_actions";
const SHARED_VIEWS: &str = "shared_traceability_views";

/// Insert body: the DTO's fields plus the owning user
#[derive(Serialize)]
struct WithOwner<'a, T: Serialize> {
    user_id: Uuid,
    #[serde(flatten)]
    fields: &'a T,
}

impl<'a, T: Serialize> WithOwner<'a, T> {
    fn new(auth: &AuthContext, fields: &'a T) -> Self {
        Self {
            user_id: auth.user_id,
            fields,
        }
    }
}

/// Patch one owned row; no matching row means the id is unknown to the store
async fn patch_row(
    client: &PostgrestClient,
    table: &'static str,
    entity: &str,
    id: Uuid,
    body: Value,
    auth: &AuthContext,
) -> DomainResult<()> {
    let rows: Vec<Value> = client.patch(table, &row_of(id, auth), &body, auth).await?;
    if rows.is_empty() {
        return Err(DomainError::EntityNotFound(entity.to_string(), id));
    }
    Ok(())
}

/// Remote implementation for VisionRepository
#[derive(Debug, Clone)]
pub struct RestVisionRepository {
    client: Arc<PostgrestClient>,
}

impl RestVisionRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisionRepository for RestVisionRepository {
    async fn find_for_year(&self, year: i32, auth: &AuthContext) -> DomainResult<Option<Vision>> {
        let filters: Vec<Filter> = vec![owned_by(auth), eq("year", year), ("limit", "1".to_string())];
        let rows: Vec<Vision> = self.client.select(VISIONS, &filters, auth).await?;
        Ok(rows.into_iter().next())
    }

    async fn create(&self, new_vision: &NewVision, auth: &AuthContext) -> DomainResult<Vision> {
        let vision = new_vision.normalized();
        self.client.insert(VISIONS, &WithOwner::new(auth, &vision), auth).await
    }
}

/// Remote implementation for GoalRepository
#[derive(Debug, Clone)]
pub struct RestGoalRepository {
    client: Arc<PostgrestClient>,
}

impl RestGoalRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GoalRepository for RestGoalRepository {
    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<Goal>> {
        let filters: Vec<Filter> = vec![owned_by(auth), ("order", "created_at.desc".to_string())];
        self.client.select(GOALS, &filters, auth).await
    }

    async fn create(&self, new_goal: &NewGoal, auth: &AuthContext) -> DomainResult<Goal> {
        let goal = new_goal.normalized();
        self.client.insert(GOALS, &WithOwner::new(auth, &goal), auth).await
    }

    async fn update_vision_link(
        &self,
        goal_id: Uuid,
        vision_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        patch_row(&self.client, GOALS, "Goal", goal_id, json!({ "annual_priority_id": vision_id }), auth).await
    }

    async fn update_progress(&self, goal_id: Uuid, progress: u8, auth: &AuthContext) -> DomainResult<()> {
        patch_row(
            &self.client,
            GOALS,
            "Goal",
            goal_id,
            json!({ "progress_percentage": progress.min(100) }),
            auth,
        )
        .await
    }
}

/// Remote implementation for PriorityRepository
#[derive(Debug, Clone)]
pub struct RestPriorityRepository {
    client: Arc<PostgrestClient>,
}

impl RestPriorityRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PriorityRepository for RestPriorityRepository {
    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<Priority>> {
        let filters: Vec<Filter> = vec![
            owned_by(auth),
            ("order", "year.desc,priority_number.asc".to_string()),
        ];
        self.client.select(PRIORITIES, &filters, auth).await
    }

    async fn create(&self, new_priority: &NewPriority, auth: &AuthContext) -> DomainResult<Priority> {
        let priority = new_priority.normalized();
        self.client.insert(PRIORITIES, &WithOwner::new(auth, &priority), auth).await
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdatePriority,
        auth: &AuthContext,
    ) -> DomainResult<Priority> {
        let rows: Vec<Priority> = self
            .client
            .patch(PRIORITIES, &row_of(id, auth), &update.normalized(), auth)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DomainError::EntityNotFound("Priority".to_string(), id))
    }

    async fn delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()> {
        let deleted = self.client.delete(PRIORITIES, &row_of(id, auth), auth).await?;
        if deleted == 0 {
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
        patch_row(&self.client, PRIORITIES, "Priority", id, json!({ "goal_id": goal_id }), auth).await
    }
}

/// Remote implementation for DailyActionRepository
#[derive(Debug, Clone)]
pub struct RestDailyActionRepository {
    client: Arc<PostgrestClient>,
}

impl RestDailyActionRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DailyActionRepository for RestDailyActionRepository {
    async fn find_recent_for_user(&self, limit: i64, auth: &AuthContext) -> DomainResult<Vec<DailyAction>> {
        let filters: Vec<Filter> = vec![
            owned_by(auth),
            ("order", "date.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        self.client.select(DAILY_ACTIONS, &filters, auth).await
    }

    async fn create(&self, new_action: &NewDailyAction, auth: &AuthContext) -> DomainResult<DailyAction> {
        let action = new_action.normalized();
        self.client.insert(DAILY_ACTIONS, &WithOwner::new(auth, &action), auth).await
    }

    async fn update_priority_link(
        &self,
        id: Uuid,
        priority_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        patch_row(&self.client, DAILY_ACTIONS, "DailyAction", id, json!({ "priority_id": priority_id }), auth).await
    }

    async fn update_goal_link(
        &self,
        id: Uuid,
        goal_id: Option<Uuid>,
        auth: &AuthContext,
    ) -> DomainResult<()> {
        patch_row(&self.client, DAILY_ACTIONS, "DailyAction", id, json!({ "goal_id": goal_id }), auth).await
    }

    async fn update_status(&self, id: Uuid, status: &str, auth: &AuthContext) -> DomainResult<()> {
        patch_row(&self.client, DAILY_ACTIONS, "DailyAction", id, json!({ "status": status }), auth).await
    }
}

#[derive(Serialize)]
struct ShareBody<'a> {
    user_id: Uuid,
    shared_with: &'a str,
    view_type: ViewType,
    is_active: bool,
}

/// Remote implementation for SharedViewRepository
#[derive(Debug, Clone)]
pub struct RestSharedViewRepository {
    client: Arc<PostgrestClient>,
}

impl RestSharedViewRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SharedViewRepository for RestSharedViewRepository {
    async fn upsert_share(
        &self,
        request: &ShareRequest,
        auth: &AuthContext,
    ) -> DomainResult<SharedTraceabilityView> {
        let viewer = request.normalized_viewer();
        let body = ShareBody {
            user_id: auth.user_id,
            shared_with: &viewer,
            view_type: request.view_type,
            is_active: true,
        };
        self.client
            .upsert(SHARED_VIEWS, "user_id,shared_with", &body, auth)
            .await
    }

    async fn revoke_share(&self, shared_with: &str, auth: &AuthContext) -> DomainResult<()> {
        let viewer = normalize_email(shared_with);
        let filters: Vec<Filter> = vec![owned_by(auth), eq("shared_with", &viewer)];
        let rows: Vec<Value> = self
            .client
            .patch(SHARED_VIEWS, &filters, &json!({ "is_active": false }), auth)
            .await?;
        if rows.is_empty() {
            return Err(DomainError::Database(DbError::NotFound(
                SHARED_VIEWS.to_string(),
                viewer,
            )));
        }
        Ok(())
    }

    async fn find_all_for_user(&self, auth: &AuthContext) -> DomainResult<Vec<SharedTraceabilityView>> {
        let filters: Vec<Filter> = vec![owned_by(auth), ("order", "created_at.asc".to_string())];
        self.client.select(SHARED_VIEWS, &filters, auth).await
    }
}
