//! Roommate Match - compatibility scoring and match lifecycle for shared housing
//!
//! This library scores how well two users' living preferences fit together,
//! ranks eligible candidates for a requester, and tracks proposed matches
//! from `pending` to `accepted` or `rejected`.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_compatibility_score, is_eligible, score_compatibility, CoreError, Matcher, RankResult};
pub use crate::models::{LivingPreferences, Match, MatchStatus, PreferenceRecord, RankedCandidate, ScoringWeights};
