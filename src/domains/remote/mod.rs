//! Supabase/PostgREST implementations of the repository traits.

pub mod client;
pub mod repositories;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::PostgrestClient;
pub use repositories::{
    RestDailyActionRepository, RestGoalRepository, RestPriorityRepository,
    RestSharedViewRepository, RestVisionRepository,
};
