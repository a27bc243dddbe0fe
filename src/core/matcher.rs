use crate::core::{
    errors::CoreError,
    filters::{is_eligible, is_other_user},
    scoring::{calculate_compatibility_score, shared_interests},
};
use crate::models::{PreferenceRecord, RankedCandidate, ScoringWeights};
use serde::{Deserialize, Serialize};

/// Candidates scoring below this are dropped unless the caller overrides it
pub const DEFAULT_MIN_SCORE: u8 = 50;

/// Result of the ranking process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResult {
    pub candidates: Vec<RankedCandidate>,
    pub total_candidates: usize,
}

/// Candidate ranker - implements the filter, score, threshold, sort pipeline
///
/// # Pipeline Stages
/// 1. Self exclusion
/// 2. Age band eligibility
/// 3. Compatibility scoring
/// 4. Threshold and stable descending sort
///
/// The pipeline holds no state between calls, so the same inputs always
/// produce the same order and scores.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    min_score: u8,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, min_score: u8) -> Self {
        Self {
            weights,
            min_score: min_score.min(100),
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), DEFAULT_MIN_SCORE)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Score a single pair with this matcher's weights
    pub fn score(&self, a: &PreferenceRecord, b: &PreferenceRecord) -> u8 {
        calculate_compatibility_score(a, b, &self.weights)
    }

    /// Rank candidates for a requester
    ///
    /// # Arguments
    /// * `requester` - The requesting user's preference record
    /// * `candidates` - Other users' records, in enumeration order
    /// * `min_score` - Per-call threshold override
    /// * `limit` - Maximum number of results, applied after sorting
    ///
    /// Ties keep their enumeration order.
    pub fn rank_candidates<'a, I>(
        &self,
        requester: &PreferenceRecord,
        candidates: I,
        min_score: Option<u8>,
        limit: Option<usize>,
    ) -> RankResult
    where
        I: IntoIterator<Item = &'a PreferenceRecord>,
    {
        let threshold = min_score.unwrap_or(self.min_score);
        let mut total_candidates = 0;

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .inspect(|_| total_candidates += 1)
            // Stage 1: never rank the requester against themselves
            .filter(|candidate| is_other_user(requester, candidate))
            // Stage 2: age band overlap
            .filter(|candidate| is_eligible(requester, candidate))
            // Stage 3 & 4: score and threshold
            .filter_map(|candidate| {
                let compatibility = self.score(requester, candidate);
                (compatibility >= threshold).then(|| RankedCandidate {
                    user_id: candidate.user_id().to_string(),
                    compatibility,
                    shared_interests: shared_interests(
                        requester.preferences(),
                        candidate.preferences(),
                    ),
                    preferences: candidate.preferences().clone(),
                })
            })
            .collect();

        // sort_by is stable, so equal scores keep enumeration order
        ranked.sort_by(|a, b| b.compatibility.cmp(&a.compatibility));

        if let Some(limit) = limit {
            ranked.truncate(limit);
        }

        tracing::debug!(
            "Ranked {} of {} candidates for {} (threshold {})",
            ranked.len(),
            total_candidates,
            requester.user_id(),
            threshold
        );

        RankResult {
            candidates: ranked,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Ranking cannot proceed without the requester's own record
pub fn require_preferences(
    user_id: &str,
    record: Option<PreferenceRecord>,
) -> Result<PreferenceRecord, CoreError> {
    record.ok_or_else(|| CoreError::PreconditionMissing(user_id.to_string()))
}
