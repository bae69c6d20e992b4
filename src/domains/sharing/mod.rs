pub mod repository;
pub mod types;

pub use repository::{SharedViewRepository, SqliteSharedViewRepository};
pub use types::{ShareRequest, SharedTraceabilityView};
