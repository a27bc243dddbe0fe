use crate::models::{
    GuestFrequency, Level, LivingPreferences, PetsPreference, PreferenceRecord, ScoringWeights,
    SleepSchedule, SmokingPreference,
};

/// Points earned per factor for one pair of records
///
/// Each field is already multiplied by its weight, so with the default
/// weights the fields sum to the final 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub cleanliness: f64,
    pub noise: f64,
    pub sleep_schedule: f64,
    pub smoking: f64,
    pub pets: f64,
    pub diet: f64,
    pub guests: f64,
    pub interests: f64,
    weight_total: f64,
}

impl ScoreBreakdown {
    pub fn points(&self) -> f64 {
        self.cleanliness
            + self.noise
            + self.sleep_schedule
            + self.smoking
            + self.pets
            + self.diet
            + self.guests
            + self.interests
    }

    /// Normalize against the weights actually applied and round half-up
    pub fn score(&self) -> u8 {
        if self.weight_total <= 0.0 {
            return 0;
        }
        // Scale before dividing: exact halves such as 56.5 stay exact
        let percentage = self.points() * 100.0 / self.weight_total;
        percentage.round().clamp(0.0, 100.0) as u8
    }
}

/// Calculate the compatibility score (0-100) between two preference records
///
/// Scoring formula, default weights in brackets:
/// ```text
/// cleanliness [15]  (5 - |a - b|) / 5
/// noise       [15]  (5 - |a - b|) / 5
/// sleep       [15]  equal = 1, either flexible = 2/3
/// smoking     [10]  equal = 1, either outdoors_only = 1/2
/// pets        [10]  equal = 1, either depends = 1/2
/// diet        [5]   equal = 1
/// guests      [10]  equal = 1, one step apart = 1/2
/// interests   [20]  |a ∩ b| / max(1, min(|a|, |b|))
/// ```
/// The result is symmetric in its arguments.
pub fn calculate_compatibility_score(
    a: &PreferenceRecord,
    b: &PreferenceRecord,
    weights: &ScoringWeights,
) -> u8 {
    score_breakdown(a.preferences(), b.preferences(), weights).score()
}

/// Score with the default weights
pub fn score_compatibility(a: &PreferenceRecord, b: &PreferenceRecord) -> u8 {
    calculate_compatibility_score(a, b, &ScoringWeights::default())
}

pub fn score_breakdown(
    a: &LivingPreferences,
    b: &LivingPreferences,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    ScoreBreakdown {
        cleanliness: level_points(a.cleanliness_level, b.cleanliness_level, weights.cleanliness),
        noise: level_points(a.noise_level, b.noise_level, weights.noise),
        sleep_schedule: sleep_points(a.sleep_schedule, b.sleep_schedule, weights.sleep_schedule),
        smoking: smoking_points(a.smoking_preferences, b.smoking_preferences, weights.smoking),
        pets: pets_points(a.pets_preferences, b.pets_preferences, weights.pets),
        diet: if a.diet_preferences == b.diet_preferences {
            weights.diet
        } else {
            0.0
        },
        guests: guest_points(a.guest_preferences, b.guest_preferences, weights.guests),
        interests: interest_points(a, b, weights.interests),
        weight_total: weights.total(),
    }
}

/// Interests both records list, in sorted order
pub fn shared_interests(a: &LivingPreferences, b: &LivingPreferences) -> Vec<String> {
    a.interests.intersection(&b.interests).cloned().collect()
}

#[inline]
fn level_points(a: Level, b: Level, weight: f64) -> f64 {
    let gap = a.get().abs_diff(b.get()) as f64;
    weight * (5.0 - gap) / 5.0
}

#[inline]
fn sleep_points(a: SleepSchedule, b: SleepSchedule, weight: f64) -> f64 {
    if a == b {
        weight
    } else if a == SleepSchedule::Flexible || b == SleepSchedule::Flexible {
        weight * 2.0 / 3.0
    } else {
        0.0
    }
}

#[inline]
fn smoking_points(a: SmokingPreference, b: SmokingPreference, weight: f64) -> f64 {
    if a == b {
        weight
    } else if a == SmokingPreference::OutdoorsOnly || b == SmokingPreference::OutdoorsOnly {
        weight / 2.0
    } else {
        0.0
    }
}

#[inline]
fn pets_points(a: PetsPreference, b: PetsPreference, weight: f64) -> f64 {
    if a == b {
        weight
    } else if a == PetsPreference::Depends || b == PetsPreference::Depends {
        weight / 2.0
    } else {
        0.0
    }
}

#[inline]
fn guest_points(a: GuestFrequency, b: GuestFrequency, weight: f64) -> f64 {
    if a == b {
        weight
    } else if a.ordinal().abs_diff(b.ordinal()) == 1 {
        weight / 2.0
    } else {
        0.0
    }
}

/// Empty interest sets score zero: the denominator floors at one
#[inline]
fn interest_points(a: &LivingPreferences, b: &LivingPreferences, weight: f64) -> f64 {
    let common = a.interests.intersection(&b.interests).count() as f64;
    let denominator = a.interests.len().min(b.interests.len()).max(1) as f64;
    weight * common / denominator
}
