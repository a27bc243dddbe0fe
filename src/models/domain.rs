use crate::core::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Youngest age accepted on either end of a roommate age band
pub const MIN_ROOMMATE_AGE: u8 = 18;

/// Declares a closed set of snake_case string values shared by the API and the database.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(CoreError::InvalidPreferences(format!(
                        "unknown {} value: {}",
                        $kind, other
                    ))),
                }
            }
        }
    };
}

text_enum! {
    /// Daily rhythm of a roommate
    SleepSchedule, "sleep schedule" {
        EarlyBird => "early_bird",
        NightOwl => "night_owl",
        Flexible => "flexible",
    }
}

text_enum! {
    DietPreference, "diet preference" {
        Vegan => "vegan",
        Vegetarian => "vegetarian",
        NoRestrictions => "no_restrictions",
    }
}

text_enum! {
    SmokingPreference, "smoking preference" {
        Yes => "yes",
        No => "no",
        OutdoorsOnly => "outdoors_only",
    }
}

text_enum! {
    PetsPreference, "pets preference" {
        Yes => "yes",
        No => "no",
        Depends => "depends",
    }
}

text_enum! {
    /// How often a roommate hosts guests
    GuestFrequency, "guest preference" {
        Often => "often",
        Sometimes => "sometimes",
        Rarely => "rarely",
    }
}

impl GuestFrequency {
    /// Ordinal position on the rarely < sometimes < often scale
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Rarely => 1,
            Self::Sometimes => 2,
            Self::Often => 3,
        }
    }
}

/// A 1..=5 self-assessed level (cleanliness, noise tolerance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidPreferences(format!(
                "level must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Level {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

/// Acceptable age band for a roommate, always `MIN_ROOMMATE_AGE <= min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AgeRangeFields")]
pub struct AgeRange {
    #[serde(rename = "ageRangeMin")]
    min: u8,
    #[serde(rename = "ageRangeMax")]
    max: u8,
}

#[derive(Deserialize)]
struct AgeRangeFields {
    #[serde(rename = "ageRangeMin")]
    min: u8,
    #[serde(rename = "ageRangeMax")]
    max: u8,
}

impl TryFrom<AgeRangeFields> for AgeRange {
    type Error = CoreError;

    fn try_from(fields: AgeRangeFields) -> Result<Self, Self::Error> {
        Self::new(fields.min, fields.max)
    }
}

impl AgeRange {
    pub fn new(min: u8, max: u8) -> Result<Self, CoreError> {
        if min < MIN_ROOMMATE_AGE || max < MIN_ROOMMATE_AGE {
            return Err(CoreError::InvalidPreferences(format!(
                "age range bounds must be at least {}",
                MIN_ROOMMATE_AGE
            )));
        }
        if min > max {
            return Err(CoreError::InvalidPreferences(format!(
                "age range minimum {} exceeds maximum {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> u8 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> u8 {
        self.max
    }

    /// True when the two bands share at least one age
    #[inline]
    pub fn overlaps(&self, other: &AgeRange) -> bool {
        !(self.min > other.max || self.max < other.min)
    }
}

/// Lifestyle attributes a user submits to describe what they need in a roommate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivingPreferences {
    pub cleanliness_level: Level,
    pub noise_level: Level,
    pub sleep_schedule: SleepSchedule,
    pub diet_preferences: DietPreference,
    pub smoking_preferences: SmokingPreference,
    pub pets_preferences: PetsPreference,
    pub guest_preferences: GuestFrequency,
    #[serde(flatten)]
    pub age_range: AgeRange,
    pub interests: BTreeSet<String>,
    pub additional_notes: Option<String>,
}

/// Collapse free-text interest tags into a set: trimmed, empties dropped, duplicates merged
pub fn normalize_interests<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Short lookup key over the attributes most likely to be compared for equality
pub fn fingerprint(preferences: &LivingPreferences) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        preferences.cleanliness_level.get(),
        preferences.noise_level.get(),
        preferences.sleep_schedule,
        preferences.smoking_preferences,
        preferences.pets_preferences,
    )
}

/// The single preference record owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    user_id: String,
    #[serde(flatten)]
    preferences: LivingPreferences,
    fingerprint: String,
}

impl PreferenceRecord {
    pub fn new(user_id: impl Into<String>, preferences: LivingPreferences) -> Self {
        let fingerprint = fingerprint(&preferences);
        Self {
            user_id: user_id.into(),
            preferences,
            fingerprint,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn preferences(&self) -> &LivingPreferences {
        &self.preferences
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Full replace of the attribute block; the owner never changes
    pub fn replace(&mut self, preferences: LivingPreferences) {
        self.fingerprint = fingerprint(&preferences);
        self.preferences = preferences;
    }
}

text_enum! {
    /// Lifecycle state of a proposed pairing
    MatchStatus, "match status" {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

impl MatchStatus {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Parse a status coming from a caller; unknown values are `InvalidStatus`
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        value
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| CoreError::InvalidStatus(value.to_string()))
    }
}

/// Sorted view of an unordered user pair
#[inline]
pub fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A persisted pairing proposal between two users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub user_id_a: String,
    pub user_id_b: String,
    pub compatibility_score: u8,
    pub status: MatchStatus,
    pub date_matched: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, user_id: &str) -> bool {
        self.user_id_a == user_id || self.user_id_b == user_id
    }

    /// The other participant, if `user_id` is one of the two
    pub fn partner_of(&self, user_id: &str) -> Option<&str> {
        if self.user_id_a == user_id {
            Some(&self.user_id_b)
        } else if self.user_id_b == user_id {
            Some(&self.user_id_a)
        } else {
            None
        }
    }

    pub fn pair_key(&self) -> (&str, &str) {
        pair_key(&self.user_id_a, &self.user_id_b)
    }
}

/// Ranked candidate returned to the requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub user_id: String,
    pub compatibility: u8,
    pub shared_interests: Vec<String>,
    pub preferences: LivingPreferences,
}

/// Scoring weights, one per compatibility factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub cleanliness: f64,
    pub noise: f64,
    pub sleep_schedule: f64,
    pub smoking: f64,
    pub pets: f64,
    pub diet: f64,
    pub guests: f64,
    pub interests: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.cleanliness
            + self.noise
            + self.sleep_schedule
            + self.smoking
            + self.pets
            + self.diet
            + self.guests
            + self.interests
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cleanliness: 15.0,
            noise: 15.0,
            sleep_schedule: 15.0,
            smoking: 10.0,
            pets: 10.0,
            diet: 5.0,
            guests: 10.0,
            interests: 20.0,
        }
    }
}
