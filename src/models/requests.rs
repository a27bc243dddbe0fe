use crate::core::CoreError;
use crate::models::domain::{
    normalize_interests, AgeRange, DietPreference, GuestFrequency, Level, LivingPreferences,
    PetsPreference, SleepSchedule, SmokingPreference,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create or replace a user's roommate preferences
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPreferencesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[validate(range(min = 1, max = 5))]
    pub cleanliness_level: u8,
    #[validate(range(min = 1, max = 5))]
    pub noise_level: u8,
    pub sleep_schedule: SleepSchedule,
    pub diet_preferences: DietPreference,
    pub smoking_preferences: SmokingPreference,
    pub pets_preferences: PetsPreference,
    pub guest_preferences: GuestFrequency,
    #[validate(range(min = 18))]
    pub age_range_min: u8,
    #[validate(range(min = 18))]
    pub age_range_max: u8,
    #[serde(default)]
    pub interests: Vec<String>,
    #[validate(length(max = 500))]
    pub additional_notes: Option<String>,
}

impl SubmitPreferencesRequest {
    /// Build the validated attribute block; range and ordering rules live in the domain types
    pub fn to_preferences(&self) -> Result<LivingPreferences, CoreError> {
        Ok(LivingPreferences {
            cleanliness_level: Level::new(self.cleanliness_level)?,
            noise_level: Level::new(self.noise_level)?,
            sleep_schedule: self.sleep_schedule,
            diet_preferences: self.diet_preferences,
            smoking_preferences: self.smoking_preferences,
            pets_preferences: self.pets_preferences,
            guest_preferences: self.guest_preferences,
            age_range: AgeRange::new(self.age_range_min, self.age_range_max)?,
            interests: normalize_interests(&self.interests),
            additional_notes: self
                .additional_notes
                .as_ref()
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty()),
        })
    }
}

/// Request to rank potential roommates
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindRoommatesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id")]
    pub user_id: String,
    pub limit: Option<u16>,
    #[validate(range(max = 100))]
    pub min_score: Option<u8>,
}

/// Request to propose a match with another user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub target_user_id: String,
    pub compatibility_score: Option<i64>,
}

/// Request to move a match to a new status
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchStatusRequest {
    #[validate(length(min = 1))]
    pub acting_user_id: String,
    pub status: String,
}

/// Query string carrying the user a request acts for
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[validate(length(min = 1))]
    pub user_id: String,
}
