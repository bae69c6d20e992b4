pub mod repository;
pub mod types;

pub use repository::{GoalRepository, SqliteGoalRepository};
pub use types::{Goal, NewGoal};
