use crate::models::{pair_key, Match, MatchStatus, PreferenceRecord};
use crate::services::repository::{RepositoryError, RoommateRepository};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MatchTable {
    by_id: HashMap<Uuid, Match>,
    // Sorted (user, user) pair -> match id
    by_pair: HashMap<(String, String), Uuid>,
}

/// In-process repository
///
/// Used for local development and tests. Preferences are kept in a
/// `BTreeMap` so candidate enumeration order is stable across calls.
#[derive(Default)]
pub struct InMemoryRepository {
    preferences: RwLock<BTreeMap<String, PreferenceRecord>>,
    matches: RwLock<MatchTable>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned_pair(a: &str, b: &str) -> (String, String) {
    let (first, second) = pair_key(a, b);
    (first.to_string(), second.to_string())
}

#[async_trait]
impl RoommateRepository for InMemoryRepository {
    async fn get_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<PreferenceRecord>, RepositoryError> {
        Ok(self.preferences.read().await.get(user_id).cloned())
    }

    async fn list_other_preferences(
        &self,
        excluding_user_id: &str,
    ) -> Result<Vec<PreferenceRecord>, RepositoryError> {
        let preferences = self.preferences.read().await;
        Ok(preferences
            .values()
            .filter(|record| record.user_id() != excluding_user_id)
            .cloned()
            .collect())
    }

    async fn insert_preferences(&self, record: &PreferenceRecord) -> Result<(), RepositoryError> {
        let mut preferences = self.preferences.write().await;
        if preferences.contains_key(record.user_id()) {
            return Err(RepositoryError::DuplicatePreferences(
                record.user_id().to_string(),
            ));
        }
        preferences.insert(record.user_id().to_string(), record.clone());
        Ok(())
    }

    async fn replace_preferences(
        &self,
        record: &PreferenceRecord,
    ) -> Result<(), RepositoryError> {
        let mut preferences = self.preferences.write().await;
        match preferences.get_mut(record.user_id()) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "preferences for user {}",
                record.user_id()
            ))),
        }
    }

    async fn delete_preferences(&self, user_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.preferences.write().await.remove(user_id).is_some())
    }

    async fn find_existing_match(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<Match>, RepositoryError> {
        let table = self.matches.read().await;
        Ok(table
            .by_pair
            .get(&owned_pair(user_id_a, user_id_b))
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, RepositoryError> {
        Ok(self.matches.read().await.by_id.get(&match_id).cloned())
    }

    async fn list_matches_for_user(&self, user_id: &str) -> Result<Vec<Match>, RepositoryError> {
        let table = self.matches.read().await;
        let mut matches: Vec<Match> = table
            .by_id
            .values()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.date_matched
                .cmp(&a.date_matched)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matches)
    }

    async fn insert_match(&self, new_match: &Match) -> Result<Match, RepositoryError> {
        let mut table = self.matches.write().await;
        let key = owned_pair(&new_match.user_id_a, &new_match.user_id_b);
        if table.by_pair.contains_key(&key) {
            return Err(RepositoryError::DuplicateMatch(
                new_match.user_id_a.clone(),
                new_match.user_id_b.clone(),
            ));
        }
        table.by_pair.insert(key, new_match.id);
        table.by_id.insert(new_match.id, new_match.clone());
        Ok(new_match.clone())
    }

    async fn update_match_status(
        &self,
        match_id: Uuid,
        expected: MatchStatus,
        status: MatchStatus,
    ) -> Result<Option<Match>, RepositoryError> {
        let mut table = self.matches.write().await;
        let Some(stored) = table.by_id.get_mut(&match_id) else {
            return Err(RepositoryError::NotFound(format!("match {}", match_id)));
        };
        if stored.status != expected {
            return Ok(None);
        }
        stored.status = status;
        Ok(Some(stored.clone()))
    }

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}
