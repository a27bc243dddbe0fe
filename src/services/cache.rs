use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache for ranking results
///
/// L1 is an in-process `moka` cache. L2 is Redis, shared across instances,
/// and optional: without it the manager works from L1 alone.
///
/// Ranking keys embed a generation number. Bumping the generation makes every
/// earlier entry unreachable, including entries written after the bump by a
/// reader that started before it. With Redis the generation lives in Redis so
/// all instances agree on it.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    local_generation: AtomicU64,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: Self::build_l1(l1_size, ttl_secs),
            local_generation: AtomicU64::new(0),
            ttl_secs,
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: Self::build_l1(l1_size, ttl_secs),
            local_generation: AtomicU64::new(0),
            ttl_secs,
        }
    }

    fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
        moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build()
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);

                // Populate L1 cache
                let bytes = json.as_bytes().to_vec();
                self.l1_cache.insert(key.to_string(), bytes).await;

                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in every configured tier
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Current ranking generation
    pub async fn generation(&self) -> Result<u64, CacheError> {
        match &self.redis {
            Some(redis) => {
                let mut conn = redis.lock().await;
                let value: Option<u64> = redis::cmd("GET")
                    .arg(CacheKey::GENERATION)
                    .query_async(&mut *conn)
                    .await?;
                Ok(value.unwrap_or(0))
            }
            None => Ok(self.local_generation.load(Ordering::SeqCst)),
        }
    }

    /// Advance the ranking generation, returning the new value
    pub async fn bump_generation(&self) -> Result<u64, CacheError> {
        let generation = match &self.redis {
            Some(redis) => {
                let mut conn = redis.lock().await;
                redis::cmd("INCR")
                    .arg(CacheKey::GENERATION)
                    .query_async::<u64>(&mut *conn)
                    .await?
            }
            None => self.local_generation.fetch_add(1, Ordering::SeqCst) + 1,
        };

        tracing::debug!("Ranking cache generation is now {}", generation);
        Ok(generation)
    }

    /// Invalidate all cache entries matching a pattern
    ///
    /// L1 has no pattern index and is cleared entirely.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate_all();

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let keys: Vec<String> = redis::cmd("KEYS")
                .arg(pattern)
                .query_async(&mut *conn)
                .await?;

            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(keys)
                    .query_async::<()>(&mut *conn)
                    .await?;
            }
        }

        tracing::debug!("Invalidated cache pattern: {}", pattern);
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Pattern matching every cached ranking
    pub const RANKINGS_PATTERN: &'static str = "roommates:*";

    /// Counter key; must not match `RANKINGS_PATTERN`
    pub const GENERATION: &'static str = "roommate_rankings:generation";

    /// Build a cache key for a user's ranked roommates at a given threshold
    pub fn rankings(generation: u64, user_id: &str, min_score: u8) -> String {
        format!("roommates:{}:{}:{}", generation, user_id, min_score)
    }
}
