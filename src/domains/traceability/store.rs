use crate::auth::AuthContext;
use crate::config::DEFAULT_TASK_FETCH_LIMIT;
use crate::domains::daily_action::DailyAction;
use crate::domains::goal::Goal;
use crate::domains::priority::{NewPriority, Priority, UpdatePriority};
use crate::domains::sharing::{ShareRequest, SharedTraceabilityView};
use crate::domains::traceability::command::{CommandOutcome, TraceabilityCommand};
use crate::domains::traceability::path::traceability_path;
use crate::domains::traceability::repositories::TraceabilityRepositories;
use crate::domains::traceability::scope::priorities_by_scope;
use crate::domains::traceability::tree::build_tree;
use crate::domains::traceability::types::{
    FetchSummary, TraceabilityNode, TraceabilityPath, TraceabilityState,
};
use crate::domains::vision::Vision;
use crate::errors::{DomainError, DomainResult, ServiceError, ServiceResult};
use crate::notification::{Notification, Notifier};
use crate::types::PriorityScope;
use crate::validation::normalize_email;
use chrono::{Datelike, Local, NaiveDate};
use std::sync::Arc;
use uuid::Uuid;

/// Per-session mirror of the user's traceability hierarchy.
///
/// Owned by whoever holds the session and mutated through `&mut self`.
/// Reads are served from memory; writes go to the repositories first and
/// are mirrored locally only once the remote write succeeded.
pub struct TraceabilityStore {
    repositories: TraceabilityRepositories,
    notifier: Arc<dyn Notifier>,
    auth: Option<AuthContext>,
    task_fetch_limit: i64,
    state: TraceabilityState,
    tree: Option<TraceabilityNode>,
}

impl TraceabilityStore {
    pub fn new(
        repositories: TraceabilityRepositories,
        notifier: Arc<dyn Notifier>,
        auth: Option<AuthContext>,
    ) -> Self {
        Self {
            repositories,
            notifier,
            auth,
            task_fetch_limit: DEFAULT_TASK_FETCH_LIMIT,
            state: TraceabilityState::default(),
            tree: None,
        }
    }

    pub fn with_task_fetch_limit(mut self, limit: i64) -> Self {
        self.task_fetch_limit = limit.max(1);
        self
    }

    /// Swap the session. Signing out (or switching user) drops the cached data.
    pub fn set_session(&mut self, auth: Option<AuthContext>) {
        let same_user = match (&self.auth, &auth) {
            (Some(current), Some(next)) => current.user_id == next.user_id,
            _ => false,
        };
        if !same_user {
            self.state = TraceabilityState::default();
            self.tree = None;
        }
        self.auth = auth;
    }

    pub fn session(&self) -> Option<&AuthContext> {
        self.auth.as_ref()
    }

    pub fn state(&self) -> &TraceabilityState {
        &self.state
    }

    pub fn vision(&self) -> Option<&Vision> {
        self.state.vision.as_ref()
    }

    pub fn goals(&self) -> &[Goal] {
        &self.state.goals
    }

    pub fn priorities(&self) -> &[Priority] {
        &self.state.priorities
    }

    pub fn daily_actions(&self) -> &[DailyAction] {
        &self.state.daily_actions
    }

    pub fn shared_views(&self) -> &[SharedTraceabilityView] {
        &self.state.shared_views
    }

    /// The derived tree, `None` until a vision for the year is loaded
    pub fn tree(&self) -> Option<&TraceabilityNode> {
        self.tree.as_ref()
    }

    pub fn traceability_path(&self, task_id: Uuid) -> Option<TraceabilityPath<'_>> {
        traceability_path(&self.state, task_id)
    }

    /// Priorities of `scope` current on `reference` (today when `None`)
    pub fn priorities_by_scope(&self, scope: PriorityScope, reference: Option<NaiveDate>) -> Vec<&Priority> {
        let reference = reference.unwrap_or_else(|| Local::now().date_naive());
        priorities_by_scope(&self.state.priorities, scope, reference)
    }

    /// Load the current year's hierarchy
    pub async fn fetch(&mut self) -> ServiceResult<FetchSummary> {
        self.fetch_for_year(Local::now().year()).await
    }

    /// Load the vision for `year` together with all goals, priorities and the
    /// most recent daily actions.
    ///
    /// The four reads run concurrently. A read that fails is logged and its
    /// collection keeps what it held before; the others are still applied.
    pub async fn fetch_for_year(&mut self, year: i32) -> ServiceResult<FetchSummary> {
        let auth = AuthContext::require(self.auth.as_ref())?.clone();
        log::debug!("Fetching traceability data for user {} ({})", auth.user_id, year);

        let repos = &self.repositories;
        let (vision, goals, priorities, daily_actions) = tokio::join!(
            repos.visions.find_for_year(year, &auth),
            repos.goals.find_all_for_user(&auth),
            repos.priorities.find_all_for_user(&auth),
            repos.daily_actions.find_recent_for_user(self.task_fetch_limit, &auth),
        );

        let summary = FetchSummary {
            vision: store_loaded("vision", vision, &mut self.state.vision),
            goals: store_loaded("goals", goals, &mut self.state.goals),
            priorities: store_loaded("priorities", priorities, &mut self.state.priorities),
            daily_actions: store_loaded("daily actions", daily_actions, &mut self.state.daily_actions),
        };
        self.rebuild_tree();

        log::debug!(
            "Fetched {} goals, {} priorities, {} daily actions",
            self.state.goals.len(),
            self.state.priorities.len(),
            self.state.daily_actions.len()
        );
        Ok(summary)
    }

    /// Load the views this user has shared; failures are logged like fetch
    pub async fn fetch_shared_views(&mut self) -> ServiceResult<bool> {
        let auth = AuthContext::require(self.auth.as_ref())?.clone();
        let result = self.repositories.shared_views.find_all_for_user(&auth).await;
        Ok(store_loaded("shared views", result, &mut self.state.shared_views))
    }

    /// Run one command: validate, write remotely, mirror locally, notify.
    ///
    /// Without a session nothing happens and no notification is raised.
    pub async fn execute(&mut self, command: TraceabilityCommand) -> ServiceResult<CommandOutcome> {
        let auth = AuthContext::require(self.auth.as_ref())?.clone();

        let result = match command.validate() {
            Ok(()) => self.perform(&command, &auth).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                self.apply(&command, &outcome);
                self.rebuild_tree();

                let (title, message) = command.success_message();
                log::info!("{}", message);
                self.notifier.notify(Notification::success(title, message));
                Ok(outcome)
            }
            Err(e) => {
                let title = command.failure_title();
                log::error!("{}: {}", title, e);
                self.notifier.notify(Notification::error(title, e.to_string()));
                Err(ServiceError::Domain(e))
            }
        }
    }

    /// The single remote write behind each command
    async fn perform(&self, command: &TraceabilityCommand, auth: &AuthContext) -> DomainResult<CommandOutcome> {
        let repos = &self.repositories;
        match command {
            TraceabilityCommand::LinkGoalToVision { goal_id, vision_id } => {
                repos.goals.update_vision_link(*goal_id, *vision_id, auth).await?;
                Ok(CommandOutcome::Applied)
            }
            TraceabilityCommand::LinkPriorityToGoal { priority_id, goal_id } => {
                repos.priorities.update_goal_link(*priority_id, *goal_id, auth).await?;
                Ok(CommandOutcome::Applied)
            }
            TraceabilityCommand::LinkTaskToPriority { task_id, priority_id } => {
                repos.daily_actions.update_priority_link(*task_id, *priority_id, auth).await?;
                Ok(CommandOutcome::Applied)
            }
            TraceabilityCommand::LinkTaskToGoal { task_id, goal_id } => {
                repos.daily_actions.update_goal_link(*task_id, *goal_id, auth).await?;
                Ok(CommandOutcome::Applied)
            }
            TraceabilityCommand::CreatePriority(new_priority) => {
                let created = repos.priorities.create(new_priority, auth).await?;
                Ok(CommandOutcome::Priority(created))
            }
            TraceabilityCommand::UpdatePriority { priority_id, update } => {
                if let Some(current) = self.state.priority(*priority_id) {
                    update.validate_against(current)?;
                }
                let updated = repos.priorities.update(*priority_id, update, auth).await?;
                Ok(CommandOutcome::Priority(updated))
            }
            TraceabilityCommand::DeletePriority { priority_id } => {
                repos.priorities.delete(*priority_id, auth).await?;
                Ok(CommandOutcome::Deleted(*priority_id))
            }
            TraceabilityCommand::ShareView(request) => {
                let share = repos.shared_views.upsert_share(request, auth).await?;
                Ok(CommandOutcome::Share(share))
            }
            TraceabilityCommand::RevokeShare { shared_with } => {
                repos.shared_views.revoke_share(shared_with, auth).await?;
                Ok(CommandOutcome::Applied)
            }
            TraceabilityCommand::UpdateGoalProgress { goal_id, progress } => {
                let progress = TraceabilityCommand::clamped_progress(*progress);
                repos.goals.update_progress(*goal_id, progress, auth).await?;
                Ok(CommandOutcome::Applied)
            }
            TraceabilityCommand::SetTaskStatus { task_id, status } => {
                repos.daily_actions.update_status(*task_id, status.trim(), auth).await?;
                Ok(CommandOutcome::Applied)
            }
        }
    }

    /// Mirror a successful write into the local collections
    fn apply(&mut self, command: &TraceabilityCommand, outcome: &CommandOutcome) {
        let state = &mut self.state;
        match (command, outcome) {
            (TraceabilityCommand::LinkGoalToVision { goal_id, vision_id }, _) => {
                if let Some(goal) = state.goal_mut(*goal_id) {
                    goal.annual_priority_id = *vision_id;
                }
            }
            (TraceabilityCommand::LinkPriorityToGoal { priority_id, goal_id }, _) => {
                if let Some(priority) = state.priority_mut(*priority_id) {
                    priority.goal_id = *goal_id;
                }
            }
            (TraceabilityCommand::LinkTaskToPriority { task_id, priority_id }, _) => {
                if let Some(task) = state.daily_action_mut(*task_id) {
                    task.priority_id = *priority_id;
                }
            }
            (TraceabilityCommand::LinkTaskToGoal { task_id, goal_id }, _) => {
                if let Some(task) = state.daily_action_mut(*task_id) {
                    task.goal_id = *goal_id;
                }
            }
            (TraceabilityCommand::CreatePriority(_), CommandOutcome::Priority(created)) => {
                state.priorities.push(created.clone());
            }
            (TraceabilityCommand::UpdatePriority { .. }, CommandOutcome::Priority(updated)) => {
                match state.priority_mut(updated.id) {
                    Some(existing) => *existing = updated.clone(),
                    None => state.priorities.push(updated.clone()),
                }
            }
            (TraceabilityCommand::DeletePriority { priority_id }, _) => {
                state.priorities.retain(|p| p.id != *priority_id);
                // the foreign key is ON DELETE SET NULL
                for task in state
                    .daily_actions
                    .iter_mut()
                    .filter(|t| t.priority_id == Some(*priority_id))
                {
                    task.priority_id = None;
                }
            }
            (TraceabilityCommand::ShareView(_), CommandOutcome::Share(share)) => {
                match state
                    .shared_views
                    .iter_mut()
                    .find(|s| s.shared_with == share.shared_with)
                {
                    Some(existing) => *existing = share.clone(),
                    None => state.shared_views.push(share.clone()),
                }
            }
            (TraceabilityCommand::RevokeShare { shared_with }, _) => {
                let viewer = normalize_email(shared_with);
                for share in state.shared_views.iter_mut().filter(|s| s.shared_with == viewer) {
                    share.is_active = false;
                }
            }
            (TraceabilityCommand::UpdateGoalProgress { goal_id, progress }, _) => {
                if let Some(goal) = state.goal_mut(*goal_id) {
                    goal.progress_percentage = TraceabilityCommand::clamped_progress(*progress);
                }
            }
            (TraceabilityCommand::SetTaskStatus { task_id, status }, _) => {
                if let Some(task) = state.daily_action_mut(*task_id) {
                    task.status = status.trim().to_string();
                }
            }
            (command, outcome) => {
                log::warn!("No local effect for {:?} with outcome {:?}", command, outcome);
            }
        }
    }

    fn rebuild_tree(&mut self) {
        self.tree = build_tree(&self.state);
    }

    pub async fn link_goal_to_vision(&mut self, goal_id: Uuid, vision_id: Option<Uuid>) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::LinkGoalToVision { goal_id, vision_id })
            .await
            .map(|_| ())
    }

    pub async fn link_priority_to_goal(&mut self, priority_id: Uuid, goal_id: Option<Uuid>) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::LinkPriorityToGoal { priority_id, goal_id })
            .await
            .map(|_| ())
    }

    pub async fn link_task_to_priority(&mut self, task_id: Uuid, priority_id: Option<Uuid>) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::LinkTaskToPriority { task_id, priority_id })
            .await
            .map(|_| ())
    }

    pub async fn link_task_to_goal(&mut self, task_id: Uuid, goal_id: Option<Uuid>) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::LinkTaskToGoal { task_id, goal_id })
            .await
            .map(|_| ())
    }

    pub async fn create_priority(&mut self, new_priority: NewPriority) -> ServiceResult<Priority> {
        match self.execute(TraceabilityCommand::CreatePriority(new_priority)).await? {
            CommandOutcome::Priority(priority) => Ok(priority),
            other => Err(unexpected_outcome(other)),
        }
    }

    pub async fn update_priority(&mut self, priority_id: Uuid, update: UpdatePriority) -> ServiceResult<Priority> {
        match self
            .execute(TraceabilityCommand::UpdatePriority { priority_id, update })
            .await?
        {
            CommandOutcome::Priority(priority) => Ok(priority),
            other => Err(unexpected_outcome(other)),
        }
    }

    pub async fn delete_priority(&mut self, priority_id: Uuid) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::DeletePriority { priority_id })
            .await
            .map(|_| ())
    }

    pub async fn share_view(&mut self, request: ShareRequest) -> ServiceResult<SharedTraceabilityView> {
        match self.execute(TraceabilityCommand::ShareView(request)).await? {
            CommandOutcome::Share(share) => Ok(share),
            other => Err(unexpected_outcome(other)),
        }
    }

    pub async fn revoke_share(&mut self, shared_with: impl Into<String>) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::RevokeShare { shared_with: shared_with.into() })
            .await
            .map(|_| ())
    }

    pub async fn update_goal_progress(&mut self, goal_id: Uuid, progress: i64) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::UpdateGoalProgress { goal_id, progress })
            .await
            .map(|_| ())
    }

    pub async fn set_task_status(&mut self, task_id: Uuid, status: impl Into<String>) -> ServiceResult<()> {
        self.execute(TraceabilityCommand::SetTaskStatus { task_id, status: status.into() })
            .await
            .map(|_| ())
    }
}

/// Keep `target` unless the read succeeded
fn store_loaded<T>(label: &str, result: DomainResult<T>, target: &mut T) -> bool {
    match result {
        Ok(value) => {
            *target = value;
            true
        }
        Err(e) => {
            log::warn!("Failed to fetch {}: {}", label, e);
            false
        }
    }
}

fn unexpected_outcome(outcome: CommandOutcome) -> ServiceError {
    ServiceError::Domain(DomainError::Internal(format!(
        "Unexpected command outcome: {:?}",
        outcome
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;
    use crate::db_migration::run_migrations;
    use crate::domains::daily_action::NewDailyAction;
    use crate::domains::goal::NewGoal;
    use crate::domains::vision::NewVision;
    use crate::notification::testing::RecordingNotifier;
    use crate::types::{PriorityStatus, ViewType, COMPLETED_STATUS};
    use sqlx::SqlitePool;

    struct Harness {
        pool: SqlitePool,
        auth: AuthContext,
        notifier: Arc<RecordingNotifier>,
        store: TraceabilityStore,
    }

    async fn harness() -> Harness {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        let auth = AuthContext::new(Uuid::new_v4(), "token");
        let notifier = Arc::new(RecordingNotifier::default());
        let store = TraceabilityStore::new(
            TraceabilityRepositories::sqlite(pool.clone()),
            notifier.clone(),
            Some(auth.clone()),
        );
        Harness { pool, auth, notifier, store }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly(title: &str, week: u32) -> NewPriority {
        NewPriority {
            week_number: Some(week),
            ..NewPriority::new(PriorityScope::Weekly, 1, title, 2025)
        }
    }

    /// Vision, one linked goal, one task under the goal; returns (goal, task)
    async fn seed(h: &Harness) -> (Goal, DailyAction) {
        let repos = TraceabilityRepositories::sqlite(h.pool.clone());
        let vision = repos
            .visions
            .create(&NewVision { year: 2025, ..Default::default() }, &h.auth)
            .await
            .unwrap();
        let goal = repos
            .goals
            .create(
                &NewGoal {
                    title: "Walk daily".into(),
                    progress_percentage: Some(20),
                    annual_priority_id: Some(vision.id),
                    ..Default::default()
                },
                &h.auth,
            )
            .await
            .unwrap();
        let task = repos
            .daily_actions
            .create(
                &NewDailyAction {
                    goal_id: Some(goal.id),
                    ..NewDailyAction::new("Walk to the shop", date(2025, 1, 27))
                },
                &h.auth,
            )
            .await
            .unwrap();
        (goal, task)
    }

    #[tokio::test]
    async fn test_fetch_builds_tree() {
        let mut h = harness().await;
        let (goal, task) = seed(&h).await;

        let summary = h.store.fetch_for_year(2025).await.unwrap();
        assert!(summary.is_complete());

        let tree = h.store.tree().unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].id, goal.id);
        assert_eq!(tree.children[0].progress, 20);
        assert_eq!(tree.children[0].children[0].id, task.id);

        let path = h.store.traceability_path(task.id).unwrap();
        assert_eq!(path.goal.map(|g| g.id), Some(goal.id));
        assert!(path.priority.is_none());
        assert!(path.vision.is_some());
        assert!(h.store.traceability_path(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_session_does_nothing() {
        let mut h = harness().await;
        h.store.set_session(None);

        let err = h.store.fetch_for_year(2025).await.unwrap_err();
        assert!(matches!(err, ServiceError::Authentication(_)));

        let err = h.store.delete_priority(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Authentication(_)));
        assert!(h.notifier.all().is_empty());
    }

    #[tokio::test]
    async fn test_partial_fetch_keeps_previous_collection() {
        let mut h = harness().await;
        let (_, task) = seed(&h).await;
        h.store.fetch_for_year(2025).await.unwrap();
        assert_eq!(h.store.daily_actions().len(), 1);

        sqlx::query("DROP TABLE daily_actions").execute(&h.pool).await.unwrap();
        let summary = h.store.fetch_for_year(2025).await.unwrap();

        assert!(!summary.daily_actions);
        assert_eq!(summary.failed(), vec!["daily_actions"]);
        assert!(summary.goals && summary.priorities && summary.vision);
        assert_eq!(h.store.daily_actions()[0].id, task.id);
        assert!(h.notifier.all().is_empty());
    }

    #[tokio::test]
    async fn test_task_moves_from_goal_to_priority() {
        let mut h = harness().await;
        let (goal, task) = seed(&h).await;
        h.store.fetch_for_year(2025).await.unwrap();

        let priority = h.store.create_priority(weekly("Three walks", 5)).await.unwrap();
        h.store.link_priority_to_goal(priority.id, Some(goal.id)).await.unwrap();
        h.store.link_task_to_priority(task.id, Some(priority.id)).await.unwrap();

        let tree = h.store.tree().unwrap();
        let goal_node = tree.find(goal.id).unwrap();
        // still goal-linked, but the priority link takes precedence
        assert_eq!(goal_node.children.len(), 1);
        assert_eq!(goal_node.children[0].id, priority.id);
        assert_eq!(goal_node.children[0].children[0].id, task.id);

        let path = h.store.traceability_path(task.id).unwrap();
        assert_eq!(path.priority.map(|p| p.id), Some(priority.id));
        assert_eq!(path.goal.map(|g| g.id), Some(goal.id));

        h.store.set_task_status(task.id, COMPLETED_STATUS).await.unwrap();
        assert_eq!(h.store.tree().unwrap().find(priority.id).unwrap().progress, 100);
        assert_eq!(h.notifier.successes().len(), 4);
        assert!(h.notifier.errors().is_empty());
    }

    #[tokio::test]
    async fn test_failed_link_leaves_state_unchanged() {
        let mut h = harness().await;
        let (_, task) = seed(&h).await;
        h.store.fetch_for_year(2025).await.unwrap();
        let before = h.store.state().clone();

        // unknown priority: rejected by the foreign key
        let result = h.store.link_task_to_priority(task.id, Some(Uuid::new_v4())).await;

        assert!(result.is_err());
        assert_eq!(h.store.state(), &before);
        assert_eq!(h.notifier.errors().len(), 1);
        assert_eq!(h.notifier.errors()[0].title, "Failed to link task");
        assert!(h.notifier.successes().is_empty());
    }

    #[tokio::test]
    async fn test_link_unknown_goal_fails_once() {
        let mut h = harness().await;
        h.store.fetch_for_year(2025).await.unwrap();

        let missing = Uuid::new_v4();
        let err = h.store.link_goal_to_vision(missing, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::EntityNotFound(_, id)) if id == missing));
        assert_eq!(h.notifier.all().len(), 1);
    }

    #[tokio::test]
    async fn test_create_then_update_priority_keeps_last_write() {
        let mut h = harness().await;
        h.store.fetch_for_year(2025).await.unwrap();

        let created = h.store.create_priority(weekly("Plan meals", 5)).await.unwrap();
        assert_eq!(created.user_id, h.auth.user_id);

        h.store
            .update_priority(created.id, UpdatePriority { title: Some("Plan and shop".into()), ..Default::default() })
            .await
            .unwrap();
        h.store
            .update_priority(created.id, UpdatePriority { status: Some(PriorityStatus::Deferred), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(h.store.priorities().len(), 1);
        let local = &h.store.priorities()[0];
        assert_eq!(local.title, "Plan and shop");
        assert_eq!(local.status, PriorityStatus::Deferred);

        h.store.fetch_for_year(2025).await.unwrap();
        assert_eq!(h.store.priorities()[0].title, "Plan and shop");
    }

    #[tokio::test]
    async fn test_scope_switch_without_locator_is_rejected() {
        let mut h = harness().await;
        let created = h.store.create_priority(weekly("Plan meals", 5)).await.unwrap();

        let result = h
            .store
            .update_priority(
                created.id,
                UpdatePriority { scope: Some(PriorityScope::Daily), ..Default::default() },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Domain(DomainError::Validation(_)))));

        // clearing the week of a loaded weekly priority is caught on the merged values
        let result = h
            .store
            .update_priority(created.id, UpdatePriority { week_number: Some(None), ..Default::default() })
            .await;
        assert!(matches!(result, Err(ServiceError::Domain(DomainError::Validation(_)))));
        assert_eq!(h.notifier.errors().len(), 2);

        let repos = TraceabilityRepositories::sqlite(h.pool.clone());
        let stored = repos.priorities.find_all_for_user(&h.auth).await.unwrap();
        assert_eq!(stored[0].scope, PriorityScope::Weekly);
        assert_eq!(stored[0].week_number, Some(5));
        assert_eq!(h.store.priorities()[0], stored[0]);

        let moved = h
            .store
            .update_priority(
                created.id,
                UpdatePriority {
                    scope: Some(PriorityScope::Daily),
                    date: Some(Some(date(2025, 1, 29))),
                    week_number: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.scope, PriorityScope::Daily);
        let today = h.store.priorities_by_scope(PriorityScope::Daily, Some(date(2025, 1, 29)));
        assert_eq!(today.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_priority_is_not_sent() {
        let mut h = harness().await;

        let result = h.store.create_priority(weekly("  ", 5)).await;
        assert!(matches!(result, Err(ServiceError::Domain(DomainError::Validation(_)))));
        assert_eq!(h.notifier.errors().len(), 1);
        assert_eq!(h.notifier.errors()[0].title, "Failed to create priority");

        let repos = TraceabilityRepositories::sqlite(h.pool.clone());
        assert!(repos.priorities.find_all_for_user(&h.auth).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_priority_unlinks_tasks() {
        let mut h = harness().await;
        let (_, task) = seed(&h).await;
        h.store.fetch_for_year(2025).await.unwrap();

        let priority = h.store.create_priority(weekly("Three walks", 5)).await.unwrap();
        h.store.link_task_to_priority(task.id, Some(priority.id)).await.unwrap();
        h.store.delete_priority(priority.id).await.unwrap();

        assert!(h.store.priorities().is_empty());
        assert_eq!(h.store.daily_actions()[0].priority_id, None);

        // local state agrees with the store after a refetch
        h.store.fetch_for_year(2025).await.unwrap();
        assert_eq!(h.store.daily_actions()[0].priority_id, None);
    }

    #[tokio::test]
    async fn test_goal_progress_and_vision_rollup() {
        let mut h = harness().await;
        let (goal, _) = seed(&h).await;
        h.store.fetch_for_year(2025).await.unwrap();

        h.store.update_goal_progress(goal.id, 250).await.unwrap();
        assert_eq!(h.store.goals()[0].progress_percentage, 100);
        assert_eq!(h.store.tree().unwrap().find(goal.id).unwrap().progress, 100);

        // the vision counts completed goals, not goal percentages
        assert_eq!(h.store.tree().unwrap().progress, 0);

        h.store.link_goal_to_vision(goal.id, None).await.unwrap();
        assert_eq!(h.store.goals()[0].annual_priority_id, None);
    }

    #[tokio::test]
    async fn test_share_and_revoke() {
        let mut h = harness().await;

        let share = h
            .store
            .share_view(ShareRequest::new("Carer@Example.com", ViewType::GoalsOnly))
            .await
            .unwrap();
        assert_eq!(share.shared_with, "carer@example.com");
        assert_eq!(h.store.shared_views().len(), 1);

        h.store.share_view(ShareRequest::new("carer@example.com", ViewType::Full)).await.unwrap();
        assert_eq!(h.store.shared_views().len(), 1);
        assert_eq!(h.store.shared_views()[0].view_type, ViewType::Full);

        h.store.revoke_share("carer@example.com").await.unwrap();
        assert!(!h.store.shared_views()[0].is_active);

        assert!(h.store.fetch_shared_views().await.unwrap());
        assert!(!h.store.shared_views()[0].is_active);

        let err = h.store.share_view(ShareRequest::new("nope", ViewType::Full)).await;
        assert!(err.is_err());
        assert_eq!(h.notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_priorities_by_scope_uses_reference_date() {
        let mut h = harness().await;
        h.store.create_priority(weekly("Week five", 5)).await.unwrap();
        h.store.create_priority(weekly("Week six", 6)).await.unwrap();

        let found = h.store.priorities_by_scope(PriorityScope::Weekly, Some(date(2025, 1, 29)));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Week five");
    }

    #[tokio::test]
    async fn test_switching_user_clears_cache() {
        let mut h = harness().await;
        seed(&h).await;
        h.store.fetch_for_year(2025).await.unwrap();
        assert!(h.store.tree().is_some());

        h.store.set_session(Some(h.auth.clone()));
        assert!(h.store.tree().is_some());

        h.store.set_session(Some(AuthContext::new(Uuid::new_v4(), "other")));
        assert!(h.store.tree().is_none());
        assert!(h.store.goals().is_empty());
    }
}
