use crate::core::{
    create_match, require_preferences, transition_match, validate_score, CoreError, Matcher,
    RankResult,
};
use crate::models::{LivingPreferences, Match, MatchView, PreferenceRecord};
use crate::services::cache::{CacheError, CacheKey, CacheManager};
use crate::services::repository::{RepositoryError, RoommateRepository};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to callers of the roommate service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicatePreferences(user_id) => {
                CoreError::DuplicatePreferences(user_id).into()
            }
            RepositoryError::DuplicateMatch(a, b) => CoreError::DuplicateMatch(a, b).into(),
            RepositoryError::NotFound(what) => CoreError::NotFound(what).into(),
            other => ServiceError::Storage(other),
        }
    }
}

/// Result limits applied to ranking requests
#[derive(Debug, Clone, Copy)]
pub struct RankingLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Wires the matching core to its storage and cache collaborators
#[derive(Clone)]
pub struct RoommateService {
    repository: Arc<dyn RoommateRepository>,
    cache: Arc<CacheManager>,
    matcher: Matcher,
    limits: RankingLimits,
}

impl RoommateService {
    pub fn new(
        repository: Arc<dyn RoommateRepository>,
        cache: Arc<CacheManager>,
        matcher: Matcher,
        limits: RankingLimits,
    ) -> Self {
        Self {
            repository,
            cache,
            matcher,
            limits,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub async fn health_check(&self) -> Result<bool, ServiceError> {
        Ok(self.repository.health_check().await?)
    }

    /// Create the user's record, or fully replace it if one exists
    pub async fn submit_preferences(
        &self,
        user_id: &str,
        preferences: LivingPreferences,
    ) -> Result<PreferenceRecord, ServiceError> {
        let record = match self.repository.get_preferences(user_id).await? {
            Some(mut existing) => {
                existing.replace(preferences);
                self.repository.replace_preferences(&existing).await?;
                existing
            }
            None => {
                let record = PreferenceRecord::new(user_id, preferences);
                match self.repository.insert_preferences(&record).await {
                    Ok(()) => {}
                    // A concurrent first submission won; ours becomes the replacement
                    Err(RepositoryError::DuplicatePreferences(_)) => {
                        self.repository.replace_preferences(&record).await?;
                    }
                    Err(e) => return Err(e.into()),
                }
                record
            }
        };

        tracing::info!(
            "Stored preferences for {} (fingerprint {})",
            user_id,
            record.fingerprint()
        );
        self.invalidate_rankings().await;
        Ok(record)
    }

    /// Create the user's first record; fails if one already exists
    pub async fn create_preferences(
        &self,
        user_id: &str,
        preferences: LivingPreferences,
    ) -> Result<PreferenceRecord, ServiceError> {
        let record = PreferenceRecord::new(user_id, preferences);
        self.repository.insert_preferences(&record).await?;
        self.invalidate_rankings().await;
        Ok(record)
    }

    pub async fn get_preferences(&self, user_id: &str) -> Result<PreferenceRecord, ServiceError> {
        self.repository
            .get_preferences(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("preferences for user {}", user_id)).into())
    }

    pub async fn delete_preferences(&self, user_id: &str) -> Result<(), ServiceError> {
        if !self.repository.delete_preferences(user_id).await? {
            return Err(CoreError::NotFound(format!("preferences for user {}", user_id)).into());
        }

        tracing::info!("Deleted preferences for {}", user_id);
        self.invalidate_rankings().await;
        Ok(())
    }

    /// Rank potential roommates for a user
    ///
    /// The full ranking for a (user, threshold) pair is cached under the
    /// generation observed before candidates were loaded; the limit is
    /// applied to the cached list.
    pub async fn find_roommates(
        &self,
        user_id: &str,
        limit: Option<usize>,
        min_score: Option<u8>,
    ) -> Result<RankResult, ServiceError> {
        let requester = require_preferences(user_id, self.repository.get_preferences(user_id).await?)?;
        let threshold = min_score.unwrap_or(self.matcher.min_score()).min(100);
        let limit = limit
            .unwrap_or(self.limits.default_limit)
            .min(self.limits.max_limit);

        let cache_key = match self.cache.generation().await {
            Ok(generation) => Some(CacheKey::rankings(generation, user_id, threshold)),
            Err(e) => {
                tracing::warn!("Ranking cache generation unavailable, skipping cache: {}", e);
                None
            }
        };

        let cached = match &cache_key {
            Some(key) => match self.cache.get::<RankResult>(key).await {
                Ok(cached) => Some(cached),
                Err(CacheError::CacheMiss(_)) => None,
                Err(e) => {
                    tracing::warn!("Ranking cache read failed for {}: {}", user_id, e);
                    None
                }
            },
            None => None,
        };

        let mut result = match cached {
            Some(cached) => {
                tracing::debug!("Serving cached ranking for {}", user_id);
                cached
            }
            None => {
                let candidates = self.repository.list_other_preferences(user_id).await?;
                let ranked =
                    self.matcher
                        .rank_candidates(&requester, &candidates, Some(threshold), None);

                if let Some(key) = &cache_key {
                    if let Err(e) = self.cache.set(key, &ranked).await {
                        tracing::warn!("Failed to cache ranking for {}: {}", user_id, e);
                    }
                }
                ranked
            }
        };

        result.candidates.truncate(limit);
        Ok(result)
    }

    /// Propose a match between two users with a caller-computed score
    ///
    /// The target must have submitted preferences.
    pub async fn create_match(
        &self,
        user_id: &str,
        target_user_id: &str,
        compatibility_score: Option<i64>,
    ) -> Result<Match, ServiceError> {
        let score = validate_score(compatibility_score)?;
        if self.repository.get_preferences(target_user_id).await?.is_none() {
            return Err(CoreError::NotFound(format!("user {}", target_user_id)).into());
        }

        let existing = self
            .repository
            .find_existing_match(user_id, target_user_id)
            .await?;

        let proposed = create_match(user_id, target_user_id, score, existing.as_ref())?;
        let stored = self.repository.insert_match(&proposed).await?;

        tracing::info!(
            "Created match {} between {} and {} (score {})",
            stored.id,
            user_id,
            target_user_id,
            score
        );
        Ok(stored)
    }

    /// Matches involving the user, newest first, with the other participant resolved
    pub async fn list_matches(&self, user_id: &str) -> Result<Vec<MatchView>, ServiceError> {
        let matches = self.repository.list_matches_for_user(user_id).await?;

        Ok(matches
            .into_iter()
            .filter_map(|m| {
                let other_user_id = m.partner_of(user_id)?.to_string();
                Some(MatchView {
                    matched: m,
                    other_user_id,
                })
            })
            .collect())
    }

    /// Move a match to a new status on behalf of one of its participants
    pub async fn update_match_status(
        &self,
        match_id: Uuid,
        acting_user_id: &str,
        status: &str,
    ) -> Result<Match, ServiceError> {
        let current = self
            .repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("match {}", match_id)))?;

        let updated = transition_match(&current, acting_user_id, status)?;
        if updated.status == current.status {
            return Ok(current);
        }

        match self
            .repository
            .update_match_status(match_id, current.status, updated.status)
            .await?
        {
            Some(stored) => {
                tracing::info!(
                    "Match {} moved to {} by {}",
                    match_id,
                    stored.status,
                    acting_user_id
                );
                Ok(stored)
            }
            None => {
                // Another participant finalized the match first
                let latest = self
                    .repository
                    .get_match(match_id)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("match {}", match_id)))?;
                Err(CoreError::TerminalStatus(latest.status.to_string()).into())
            }
        }
    }

    async fn invalidate_rankings(&self) {
        if let Err(e) = self.cache.bump_generation().await {
            tracing::error!("Failed to advance ranking cache generation: {}", e);
        }
        if let Err(e) = self.cache.invalidate_pattern(CacheKey::RANKINGS_PATTERN).await {
            tracing::warn!("Failed to invalidate cached rankings: {}", e);
        }
    }
}
