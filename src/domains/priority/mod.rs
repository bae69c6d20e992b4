pub mod repository;
pub mod types;

pub use repository::{PriorityRepository, SqlitePriorityRepository};
pub use types::{NewPriority, Priority, UpdatePriority};
