// Unit tests for Roommate Match

use roommate_match::core::{
    filters::{is_eligible, is_other_user},
    lifecycle::{create_match, next_status, transition_match, validate_score},
    scoring::{calculate_compatibility_score, score_breakdown, score_compatibility, shared_interests},
    CoreError,
};
use roommate_match::models::{
    normalize_interests, AgeRange, DietPreference, GuestFrequency, Level, LivingPreferences,
    MatchStatus, PetsPreference, PreferenceRecord, ScoringWeights, SleepSchedule,
    SmokingPreference,
};

fn create_preferences(
    cleanliness: u8,
    noise: u8,
    sleep: SleepSchedule,
    guests: GuestFrequency,
    age_range: (u8, u8),
    interests: &[&str],
) -> LivingPreferences {
    LivingPreferences {
        cleanliness_level: Level::new(cleanliness).unwrap(),
        noise_level: Level::new(noise).unwrap(),
        sleep_schedule: sleep,
        diet_preferences: DietPreference::NoRestrictions,
        smoking_preferences: SmokingPreference::No,
        pets_preferences: PetsPreference::No,
        guest_preferences: guests,
        age_range: AgeRange::new(age_range.0, age_range.1).unwrap(),
        interests: normalize_interests(interests.iter().copied()),
        additional_notes: None,
    }
}

fn requester() -> PreferenceRecord {
    PreferenceRecord::new(
        "requester",
        create_preferences(5, 1, SleepSchedule::EarlyBird, GuestFrequency::Rarely, (28, 40), &["yoga", "hiking"]),
    )
}

fn candidate() -> PreferenceRecord {
    PreferenceRecord::new(
        "candidate",
        create_preferences(4, 2, SleepSchedule::EarlyBird, GuestFrequency::Sometimes, (25, 35), &["hiking", "reading"]),
    )
}

#[test]
fn test_reference_pair_scores_79() {
    assert_eq!(score_compatibility(&requester(), &candidate()), 79);
}

#[test]
fn test_score_is_symmetric() {
    let a = requester();
    let b = candidate();
    assert_eq!(score_compatibility(&a, &b), score_compatibility(&b, &a));
}

#[test]
fn test_identical_preferences_score_100() {
    let a = requester();
    let b = PreferenceRecord::new("twin", a.preferences().clone());
    assert_eq!(score_compatibility(&a, &b), 100);
}

#[test]
fn test_flexible_sleep_gets_partial_credit() {
    let early = create_preferences(3, 3, SleepSchedule::EarlyBird, GuestFrequency::Sometimes, (20, 30), &["chess"]);
    let flexible = create_preferences(3, 3, SleepSchedule::Flexible, GuestFrequency::Sometimes, (20, 30), &["chess"]);
    let night = create_preferences(3, 3, SleepSchedule::NightOwl, GuestFrequency::Sometimes, (20, 30), &["chess"]);

    let weights = ScoringWeights::default();
    assert_eq!(score_breakdown(&early, &flexible, &weights).sleep_schedule, 10.0);
    assert_eq!(score_breakdown(&early, &night, &weights).sleep_schedule, 0.0);
}

#[test]
fn test_guest_gap_of_two_earns_nothing() {
    let rarely = create_preferences(3, 3, SleepSchedule::Flexible, GuestFrequency::Rarely, (20, 30), &[]);
    let often = create_preferences(3, 3, SleepSchedule::Flexible, GuestFrequency::Often, (20, 30), &[]);

    let breakdown = score_breakdown(&rarely, &often, &ScoringWeights::default());
    assert_eq!(breakdown.guests, 0.0);
    assert_eq!(breakdown.interests, 0.0);
}

const INTEREST_SHAPES: [&[&str]; 4] = [
    &[],
    &["chess"],
    &["chess", "music", "hiking"],
    &["music", "art", "film", "yoga", "running", "cooking", "travel", "poetry"],
];

/// One record per combination of enum values and cleanliness level
fn profile_sweep() -> Vec<PreferenceRecord> {
    let sleeps = [SleepSchedule::EarlyBird, SleepSchedule::NightOwl, SleepSchedule::Flexible];
    let smokings = [SmokingPreference::Yes, SmokingPreference::No, SmokingPreference::OutdoorsOnly];
    let pets = [PetsPreference::Yes, PetsPreference::No, PetsPreference::Depends];
    let guests = [GuestFrequency::Rarely, GuestFrequency::Sometimes, GuestFrequency::Often];
    let diets = [DietPreference::Vegan, DietPreference::Vegetarian, DietPreference::NoRestrictions];

    let mut records = Vec::new();
    for cleanliness in 1..=5u8 {
        for &sleep in &sleeps {
            for &smoking in &smokings {
                for &pet in &pets {
                    for &guest in &guests {
                        let i = records.len();
                        let mut prefs = create_preferences(
                            cleanliness,
                            (i % 5) as u8 + 1,
                            sleep,
                            guest,
                            (18, 99),
                            INTEREST_SHAPES[i % INTEREST_SHAPES.len()],
                        );
                        prefs.smoking_preferences = smoking;
                        prefs.pets_preferences = pet;
                        prefs.diet_preferences = diets[(i / 7) % diets.len()];
                        records.push(PreferenceRecord::new(format!("u{}", i), prefs));
                    }
                }
            }
        }
    }
    records
}

#[test]
fn test_score_properties_hold_across_sweep() {
    let records = profile_sweep();
    let weights = ScoringWeights::default();

    for a in &records {
        let self_score = score_compatibility(a, a);
        if a.preferences().interests.is_empty() {
            assert_eq!(self_score, 80, "{} against itself", a.user_id());
        } else {
            assert_eq!(self_score, 100, "{} against itself", a.user_id());
        }

        for b in &records {
            let forward = score_compatibility(a, b);
            let backward = score_compatibility(b, a);
            assert_eq!(forward, backward, "{} vs {}", a.user_id(), b.user_id());
            assert!(forward <= 100);

            let points = score_breakdown(a.preferences(), b.preferences(), &weights).points();
            assert!((0.0..=weights.total()).contains(&points));
        }
    }
}

#[test]
fn test_exact_half_score_rounds_up() {
    let shared_plus = |prefix: &str| -> Vec<String> {
        std::iter::once("hiking".to_string())
            .chain((1..8).map(|i| format!("{}{}", prefix, i)))
            .collect()
    };

    let mut a = create_preferences(5, 1, SleepSchedule::EarlyBird, GuestFrequency::Rarely, (28, 40), &[]);
    a.pets_preferences = PetsPreference::Yes;
    a.interests = normalize_interests(shared_plus("a"));

    let mut b = create_preferences(4, 2, SleepSchedule::EarlyBird, GuestFrequency::Often, (25, 35), &[]);
    b.pets_preferences = PetsPreference::No;
    b.interests = normalize_interests(shared_plus("b"));

    // 12 + 12 + 15 + 10 + 0 + 5 + 0 + 2.5
    let breakdown = score_breakdown(&a, &b, &ScoringWeights::default());
    assert_eq!(breakdown.points(), 56.5);

    let a = PreferenceRecord::new("a", a);
    let b = PreferenceRecord::new("b", b);
    assert_eq!(score_compatibility(&a, &b), 57);
    assert_eq!(score_compatibility(&b, &a), 57);
}

#[test]
fn test_custom_weights_change_score() {
    let weights = ScoringWeights {
        interests: 0.0,
        ..ScoringWeights::default()
    };
    // 69 of 80 points remain once interests stop counting
    assert_eq!(calculate_compatibility_score(&requester(), &candidate(), &weights), 86);
}

#[test]
fn test_shared_interests_sorted() {
    let a = create_preferences(3, 3, SleepSchedule::Flexible, GuestFrequency::Rarely, (20, 30), &["music", "chess", "art"]);
    let b = create_preferences(3, 3, SleepSchedule::Flexible, GuestFrequency::Rarely, (20, 30), &["art", "music"]);
    assert_eq!(shared_interests(&a, &b), vec!["art", "music"]);
}

#[test]
fn test_eligibility_by_age_overlap() {
    let r = requester();
    assert!(is_eligible(&r, &candidate()));

    let older = PreferenceRecord::new(
        "older",
        create_preferences(5, 1, SleepSchedule::EarlyBird, GuestFrequency::Rarely, (45, 60), &[]),
    );
    assert!(!is_eligible(&r, &older));
    assert!(!is_other_user(&r, &r));
    assert!(is_other_user(&r, &older));
}

#[test]
fn test_level_and_age_validation() {
    assert!(Level::new(0).is_err());
    assert!(Level::new(6).is_err());
    assert!(AgeRange::new(17, 30).is_err());
    assert!(AgeRange::new(30, 25).is_err());
    assert!(AgeRange::new(30, 30).is_ok());
}

#[test]
fn test_match_lifecycle() {
    let created = create_match("a", "b", validate_score(Some(64)).unwrap(), None).unwrap();
    assert_eq!(created.status, MatchStatus::Pending);

    let rejected = transition_match(&created, "b", "REJECTED").unwrap();
    assert_eq!(rejected.status, MatchStatus::Rejected);

    assert_eq!(
        transition_match(&rejected, "a", "accepted").unwrap_err(),
        CoreError::TerminalStatus("rejected".to_string())
    );
    assert!(next_status(MatchStatus::Pending, MatchStatus::Accepted).is_ok());
}
