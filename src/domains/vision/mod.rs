pub mod repository;
pub mod types;

pub use repository::{SqliteVisionRepository, VisionRepository};
pub use types::{NewVision, Vision};
