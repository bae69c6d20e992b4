//! The traceability store: vision → goal → priority → daily action.
//!
//! [`TraceabilityStore`] mirrors the four remote collections into memory,
//! runs every mutation as a [`TraceabilityCommand`] and keeps a derived
//! [`TraceabilityNode`] tree in step with the collections.

pub mod command;
pub mod path;
pub mod repositories;
pub mod scope;
pub mod store;
pub mod tree;
pub mod types;

pub use command::{CommandOutcome, TraceabilityCommand};
pub use path::traceability_path;
pub use repositories::TraceabilityRepositories;
pub use scope::priorities_by_scope;
pub use store::TraceabilityStore;
pub use tree::build_tree;
pub use types::{FetchSummary, NodeType, TraceabilityNode, TraceabilityPath, TraceabilityState};
