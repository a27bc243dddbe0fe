use crate::models::PreferenceRecord;

/// Cheap pre-scoring check: the two stated age bands must overlap
///
/// Only the preferred roommate-age bands are compared. Neither user's own
/// age takes part in the check.
#[inline]
pub fn is_eligible(requester: &PreferenceRecord, candidate: &PreferenceRecord) -> bool {
    requester
        .preferences()
        .age_range
        .overlaps(&candidate.preferences().age_range)
}

/// Exclude the requester's own record, identified by user id
#[inline]
pub fn is_other_user(requester: &PreferenceRecord, candidate: &PreferenceRecord) -> bool {
    requester.user_id() != candidate.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AgeRange, DietPreference, GuestFrequency, Level, LivingPreferences, PetsPreference,
        SleepSchedule, SmokingPreference,
    };
    use std::collections::BTreeSet;

    fn create_test_record(user_id: &str, min_age: u8, max_age: u8) -> PreferenceRecord {
        PreferenceRecord::new(
            user_id,
            LivingPreferences {
                cleanliness_level: Level::new(3).unwrap(),
                noise_level: Level::new(3).unwrap(),
                sleep_schedule: SleepSchedule::Flexible,
                diet_preferences: DietPreference::Vegetarian,
                smoking_preferences: SmokingPreference::No,
                pets_preferences: PetsPreference::Depends,
                guest_preferences: GuestFrequency::Sometimes,
                age_range: AgeRange::new(min_age, max_age).unwrap(),
                interests: BTreeSet::new(),
                additional_notes: None,
            },
        )
    }

    #[test]
    fn test_overlapping_ranges_eligible() {
        let requester = create_test_record("r", 25, 35);
        let candidate = create_test_record("c", 20, 30);

        assert!(is_eligible(&requester, &candidate));
    }

    #[test]
    fn test_disjoint_ranges_ineligible() {
        let requester = create_test_record("r", 25, 35);
        let candidate = create_test_record("c", 40, 50);

        assert!(!is_eligible(&requester, &candidate));
        assert!(!is_eligible(&candidate, &requester));
    }

    #[test]
    fn test_touching_ranges_eligible() {
        let requester = create_test_record("r", 25, 35);
        let candidate = create_test_record("c", 35, 45);

        assert!(is_eligible(&requester, &candidate));
    }

    #[test]
    fn test_self_excluded() {
        let requester = create_test_record("r", 25, 35);
        let same_owner = create_test_record("r", 30, 40);

        assert!(!is_other_user(&requester, &same_owner));
    }
}
