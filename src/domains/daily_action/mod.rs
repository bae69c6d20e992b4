pub mod repository;
pub mod types;

pub use repository::{DailyActionRepository, SqliteDailyActionRepository};
pub use types::{ActionParent, DailyAction, NewDailyAction};
