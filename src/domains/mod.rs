pub mod core;
pub mod daily_action;
pub mod goal;
pub mod priority;
pub mod remote;
pub mod sharing;
pub mod traceability;
pub mod vision;

pub use traceability::{TraceabilityRepositories, TraceabilityStore};
