//! Persistence contract consumed by the roommate service.
//!
//! The matching core never talks to storage itself; callers fetch records in
//! bulk through this trait and hand them to the ranker.

use crate::models::{Match, MatchStatus, PreferenceRecord};
use crate::services::postgres::PostgresError;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in a repository backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Preferences already exist for user {0}")]
    DuplicatePreferences(String),

    #[error("Match already exists between {0} and {1}")]
    DuplicateMatch(String, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] PostgresError),
}

/// Storage for preference records and matches
///
/// # Implementation Notes
///
/// - `insert_match` must be atomic with respect to the unordered pair: two
///   concurrent inserts for {a, b} and {b, a} cannot both succeed.
/// - `update_match_status` only applies when the stored status still equals
///   `expected`; otherwise it returns `Ok(None)`.
#[async_trait]
pub trait RoommateRepository: Send + Sync {
    /// Fetch the preference record owned by `user_id`
    async fn get_preferences(&self, user_id: &str)
        -> Result<Option<PreferenceRecord>, RepositoryError>;

    /// Every other user's record, in a stable enumeration order
    async fn list_other_preferences(
        &self,
        excluding_user_id: &str,
    ) -> Result<Vec<PreferenceRecord>, RepositoryError>;

    /// Store a first record; fails with `DuplicatePreferences` if one exists
    async fn insert_preferences(&self, record: &PreferenceRecord) -> Result<(), RepositoryError>;

    /// Overwrite an existing record; fails with `NotFound` if none exists
    async fn replace_preferences(&self, record: &PreferenceRecord)
        -> Result<(), RepositoryError>;

    /// Remove a whole record, returning whether one existed
    async fn delete_preferences(&self, user_id: &str) -> Result<bool, RepositoryError>;

    /// Pair-order-insensitive match lookup
    async fn find_existing_match(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<Match>, RepositoryError>;

    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, RepositoryError>;

    /// Matches involving `user_id`, newest first
    async fn list_matches_for_user(&self, user_id: &str) -> Result<Vec<Match>, RepositoryError>;

    /// Persist a new match; fails with `DuplicateMatch` if the pair is taken
    async fn insert_match(&self, new_match: &Match) -> Result<Match, RepositoryError>;

    /// Conditionally persist a status change
    async fn update_match_status(
        &self,
        match_id: Uuid,
        expected: MatchStatus,
        status: MatchStatus,
    ) -> Result<Option<Match>, RepositoryError>;

    async fn health_check(&self) -> Result<bool, RepositoryError>;
}
