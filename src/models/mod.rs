// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    fingerprint, normalize_interests, pair_key, AgeRange, DietPreference, GuestFrequency, Level,
    LivingPreferences, Match, MatchStatus, PetsPreference, PreferenceRecord, RankedCandidate,
    ScoringWeights, SleepSchedule, SmokingPreference, MIN_ROOMMATE_AGE,
};
pub use requests::{
    CreateMatchRequest, FindRoommatesRequest, SubmitPreferencesRequest, UpdateMatchStatusRequest,
    UserQuery,
};
pub use responses::{ErrorResponse, FindRoommatesResponse, HealthResponse, MatchView};
