use crate::core::DEFAULT_MIN_SCORE;
use crate::models::ScoringWeights;
use crate::services::RankingLimits;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which repository backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl MatchingSettings {
    pub fn limits(&self) -> RankingLimits {
        RankingLimits {
            default_limit: self.default_limit.min(self.max_limit),
            max_limit: self.max_limit,
        }
    }
}

fn default_min_score() -> u8 { DEFAULT_MIN_SCORE }
fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 100 }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_cleanliness_weight")]
    pub cleanliness: f64,
    #[serde(default = "default_noise_weight")]
    pub noise: f64,
    #[serde(default = "default_sleep_schedule_weight")]
    pub sleep_schedule: f64,
    #[serde(default = "default_smoking_weight")]
    pub smoking: f64,
    #[serde(default = "default_pets_weight")]
    pub pets: f64,
    #[serde(default = "default_diet_weight")]
    pub diet: f64,
    #[serde(default = "default_guests_weight")]
    pub guests: f64,
    #[serde(default = "default_interests_weight")]
    pub interests: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            cleanliness: default_cleanliness_weight(),
            noise: default_noise_weight(),
            sleep_schedule: default_sleep_schedule_weight(),
            smoking: default_smoking_weight(),
            pets: default_pets_weight(),
            diet: default_diet_weight(),
            guests: default_guests_weight(),
            interests: default_interests_weight(),
        }
    }
}

impl WeightsConfig {
    /// Every weight must be finite and non-negative
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("cleanliness", self.cleanliness),
            ("noise", self.noise),
            ("sleep_schedule", self.sleep_schedule),
            ("smoking", self.smoking),
            ("pets", self.pets),
            ("diet", self.diet),
            ("guests", self.guests),
            ("interests", self.interests),
        ];

        match named.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            Some((name, w)) => Err(ConfigError::Message(format!(
                "scoring.weights.{} must be a finite, non-negative number (got {})",
                name, w
            ))),
            None => Ok(()),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            cleanliness: config.cleanliness,
            noise: config.noise,
            sleep_schedule: config.sleep_schedule,
            smoking: config.smoking,
            pets: config.pets,
            diet: config.diet,
            guests: config.guests,
            interests: config.interests,
        }
    }
}

fn default_cleanliness_weight() -> f64 { 15.0 }
fn default_noise_weight() -> f64 { 15.0 }
fn default_sleep_schedule_weight() -> f64 { 15.0 }
fn default_smoking_weight() -> f64 { 10.0 }
fn default_pets_weight() -> f64 { 10.0 }
fn default_diet_weight() -> f64 { 5.0 }
fn default_guests_weight() -> f64 { 10.0 }
fn default_interests_weight() -> f64 { 20.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ROOMMATE_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ROOMMATE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("ROOMMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = apply_url_overrides(settings)?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ROOMMATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the scorer cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.weights.validate()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

/// Conventional `DATABASE_URL` / `REDIS_URL` variables win over file values
fn apply_url_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}
