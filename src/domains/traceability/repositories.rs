use crate::domains::daily_action::{DailyActionRepository, SqliteDailyActionRepository};
use crate::domains::goal::{GoalRepository, SqliteGoalRepository};
use crate::domains::priority::{PriorityRepository, SqlitePriorityRepository};
use crate::domains::remote::{
    PostgrestClient, RestDailyActionRepository, RestGoalRepository, RestPriorityRepository,
    RestSharedViewRepository, RestVisionRepository,
};
use crate::domains::sharing::{SharedViewRepository, SqliteSharedViewRepository};
use crate::domains::vision::{SqliteVisionRepository, VisionRepository};
use sqlx::SqlitePool;
use std::sync::Arc;

/// The repositories the store reads and writes through
#[derive(Clone)]
pub struct TraceabilityRepositories {
    pub visions: Arc<dyn VisionRepository>,
    pub goals: Arc<dyn GoalRepository>,
    pub priorities: Arc<dyn PriorityRepository>,
    pub daily_actions: Arc<dyn DailyActionRepository>,
    pub shared_views: Arc<dyn SharedViewRepository>,
}

impl TraceabilityRepositories {
    /// Local store backed by a SQLite pool
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            visions: Arc::new(SqliteVisionRepository::new(pool.clone())),
            goals: Arc::new(SqliteGoalRepository::new(pool.clone())),
            priorities: Arc::new(SqlitePriorityRepository::new(pool.clone())),
            daily_actions: Arc::new(SqliteDailyActionRepository::new(pool.clone())),
            shared_views: Arc::new(SqliteSharedViewRepository::new(pool)),
        }
    }

    /// Remote store behind the Supabase REST API
    pub fn remote(client: Arc<PostgrestClient>) -> Self {
        Self {
            visions: Arc::new(RestVisionRepository::new(client.clone())),
            goals: Arc::new(RestGoalRepository::new(client.clone())),
            priorities: Arc::new(RestPriorityRepository::new(client.clone())),
            daily_actions: Arc::new(RestDailyActionRepository::new(client.clone())),
            shared_views: Arc::new(RestSharedViewRepository::new(client)),
        }
    }
}
