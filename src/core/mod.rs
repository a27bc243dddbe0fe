// Core algorithm exports
pub mod errors;
pub mod filters;
pub mod lifecycle;
pub mod matcher;
pub mod scoring;

pub use errors::CoreError;
pub use filters::{is_eligible, is_other_user};
pub use lifecycle::{create_match, next_status, transition_match, validate_score};
pub use matcher::{require_preferences, Matcher, RankResult, DEFAULT_MIN_SCORE};
pub use scoring::{calculate_compatibility_score, score_breakdown, score_compatibility, ScoreBreakdown};
