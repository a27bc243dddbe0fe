use thiserror::Error;

/// Errors raised by the matching core
///
/// All of them are local and deterministic: retrying with the same input
/// yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Preferences required: user {0} has not submitted roommate preferences")]
    PreconditionMissing(String),

    #[error("Match already exists between {0} and {1}")]
    DuplicateMatch(String, String),

    #[error("Preferences already exist for user {0}")]
    DuplicatePreferences(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: user {0} is not a participant of this match")]
    Forbidden(String),

    #[error("Invalid status: {0} (expected pending, accepted or rejected)")]
    InvalidStatus(String),

    #[error("Match is already {0} and can no longer change status")]
    TerminalStatus(String),

    #[error("Invalid preferences: {0}")]
    InvalidPreferences(String),

    #[error("Compatibility score must be between 0 and 100, got {0}")]
    InvalidScore(i64),

    #[error("Compatibility score is required to create a match")]
    MissingScore,

    #[error("User {0} cannot be matched with themselves")]
    SelfMatch(String),
}
