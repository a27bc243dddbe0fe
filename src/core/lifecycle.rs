use crate::core::errors::CoreError;
use crate::models::{Match, MatchStatus};
use chrono::Utc;
use uuid::Uuid;

/// Check a caller-supplied compatibility score
///
/// A missing score is a caller error, never a silent default.
pub fn validate_score(score: Option<i64>) -> Result<u8, CoreError> {
    match score {
        None => Err(CoreError::MissingScore),
        Some(value) if (0..=100).contains(&value) => Ok(value as u8),
        Some(value) => Err(CoreError::InvalidScore(value)),
    }
}

/// Build a new pending match between two users
///
/// `existing` is the result of a pair-order-insensitive lookup; any hit means
/// the pair is already linked.
pub fn create_match(
    user_a: &str,
    user_b: &str,
    score: u8,
    existing: Option<&Match>,
) -> Result<Match, CoreError> {
    if user_a == user_b {
        return Err(CoreError::SelfMatch(user_a.to_string()));
    }
    if score > 100 {
        return Err(CoreError::InvalidScore(score as i64));
    }
    if existing.is_some() {
        return Err(CoreError::DuplicateMatch(
            user_a.to_string(),
            user_b.to_string(),
        ));
    }

    Ok(Match {
        id: Uuid::new_v4(),
        user_id_a: user_a.to_string(),
        user_id_b: user_b.to_string(),
        compatibility_score: score,
        status: MatchStatus::Pending,
        date_matched: Utc::now(),
    })
}

/// Apply the status state machine: pending -> accepted | rejected, terminal states are final
pub fn next_status(current: MatchStatus, requested: MatchStatus) -> Result<MatchStatus, CoreError> {
    if current.is_terminal() {
        return Err(CoreError::TerminalStatus(current.to_string()));
    }
    Ok(requested)
}

/// Transition a match on behalf of one of its participants
///
/// Checks run in order: participant, status value, state machine.
/// Only `status` changes; score and creation time are kept.
pub fn transition_match(
    current: &Match,
    acting_user_id: &str,
    requested: &str,
) -> Result<Match, CoreError> {
    if !current.involves(acting_user_id) {
        return Err(CoreError::Forbidden(acting_user_id.to_string()));
    }

    let requested = MatchStatus::parse(requested)?;
    let status = next_status(current.status, requested)?;

    Ok(Match {
        status,
        ..current.clone()
    })
}
