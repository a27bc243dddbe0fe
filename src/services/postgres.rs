use crate::models::{
    AgeRange, Level, LivingPreferences, Match, MatchStatus, PreferenceRecord,
};
use crate::services::repository::{RepositoryError, RoommateRepository};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

const PREFERENCE_COLUMNS: &str = r#"
    user_id, cleanliness_level, noise_level, sleep_schedule, diet_preferences,
    smoking_preferences, pets_preferences, guest_preferences, age_range_min,
    age_range_max, interests, additional_notes
"#;

const MATCH_COLUMNS: &str = r#"
    id, user_id_a, user_id_b, compatibility_score, status, date_matched
"#;

/// PostgreSQL repository for preference records and matches
///
/// Pair uniqueness is enforced by a unique index over the sorted pair, so
/// concurrent match creation cannot link the same two users twice.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

fn invalid(message: impl ToString) -> PostgresError {
    PostgresError::InvalidData(message.to_string())
}

fn small_to_u8(value: i16, column: &str) -> Result<u8, PostgresError> {
    u8::try_from(value).map_err(|_| invalid(format!("{} out of range: {}", column, value)))
}

fn preference_from_row(row: &PgRow) -> Result<PreferenceRecord, PostgresError> {
    let level = |column: &str| -> Result<Level, PostgresError> {
        let value = small_to_u8(row.try_get(column)?, column)?;
        Level::new(value).map_err(invalid)
    };
    let text = |column: &str| -> Result<String, PostgresError> { Ok(row.try_get(column)?) };

    let age_range = AgeRange::new(
        small_to_u8(row.try_get("age_range_min")?, "age_range_min")?,
        small_to_u8(row.try_get("age_range_max")?, "age_range_max")?,
    )
    .map_err(invalid)?;
    let interests: Vec<String> = row.try_get("interests")?;

    let preferences = LivingPreferences {
        cleanliness_level: level("cleanliness_level")?,
        noise_level: level("noise_level")?,
        sleep_schedule: text("sleep_schedule")?.parse().map_err(invalid)?,
        diet_preferences: text("diet_preferences")?.parse().map_err(invalid)?,
        smoking_preferences: text("smoking_preferences")?.parse().map_err(invalid)?,
        pets_preferences: text("pets_preferences")?.parse().map_err(invalid)?,
        guest_preferences: text("guest_preferences")?.parse().map_err(invalid)?,
        age_range,
        interests: interests.into_iter().collect(),
        additional_notes: row.try_get("additional_notes")?,
    };

    Ok(PreferenceRecord::new(text("user_id")?, preferences))
}

fn match_from_row(row: &PgRow) -> Result<Match, PostgresError> {
    let status: String = row.try_get("status")?;
    Ok(Match {
        id: row.try_get("id")?,
        user_id_a: row.try_get("user_id_a")?,
        user_id_b: row.try_get("user_id_b")?,
        compatibility_score: small_to_u8(row.try_get("compatibility_score")?, "compatibility_score")?,
        status: status.parse::<MatchStatus>().map_err(invalid)?,
        date_matched: row.try_get("date_matched")?,
    })
}

fn interests_vec(record: &PreferenceRecord) -> Vec<String> {
    record.preferences().interests.iter().cloned().collect()
}

#[async_trait]
impl RoommateRepository for PostgresClient {
    async fn get_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<PreferenceRecord>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM roommate_preferences WHERE user_id = $1",
            PREFERENCE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        Ok(row.as_ref().map(preference_from_row).transpose()?)
    }

    async fn list_other_preferences(
        &self,
        excluding_user_id: &str,
    ) -> Result<Vec<PreferenceRecord>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM roommate_preferences WHERE user_id <> $1 ORDER BY created_at, user_id",
            PREFERENCE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(excluding_user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        let records: Result<Vec<PreferenceRecord>, PostgresError> =
            rows.iter().map(preference_from_row).collect();

        tracing::debug!(
            "Loaded {} candidate preference records excluding {}",
            rows.len(),
            excluding_user_id
        );

        Ok(records?)
    }

    async fn insert_preferences(&self, record: &PreferenceRecord) -> Result<(), RepositoryError> {
        let query = r#"
            INSERT INTO roommate_preferences (
                user_id, cleanliness_level, noise_level, sleep_schedule, diet_preferences,
                smoking_preferences, pets_preferences, guest_preferences, age_range_min,
                age_range_max, interests, additional_notes, fingerprint
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (user_id) DO NOTHING
        "#;

        let prefs = record.preferences();
        let result = sqlx::query(query)
            .bind(record.user_id())
            .bind(prefs.cleanliness_level.get() as i16)
            .bind(prefs.noise_level.get() as i16)
            .bind(prefs.sleep_schedule.as_str())
            .bind(prefs.diet_preferences.as_str())
            .bind(prefs.smoking_preferences.as_str())
            .bind(prefs.pets_preferences.as_str())
            .bind(prefs.guest_preferences.as_str())
            .bind(prefs.age_range.min() as i16)
            .bind(prefs.age_range.max() as i16)
            .bind(interests_vec(record))
            .bind(prefs.additional_notes.as_deref())
            .bind(record.fingerprint())
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::DuplicatePreferences(
                record.user_id().to_string(),
            ));
        }
        Ok(())
    }

    async fn replace_preferences(
        &self,
        record: &PreferenceRecord,
    ) -> Result<(), RepositoryError> {
        let query = r#"
            UPDATE roommate_preferences SET
                cleanliness_level = $2,
                noise_level = $3,
                sleep_schedule = $4,
                diet_preferences = $5,
                smoking_preferences = $6,
                pets_preferences = $7,
                guest_preferences = $8,
                age_range_min = $9,
                age_range_max = $10,
                interests = $11,
                additional_notes = $12,
                fingerprint = $13,
                updated_at = NOW()
            WHERE user_id = $1
        "#;

        let prefs = record.preferences();
        let result = sqlx::query(query)
            .bind(record.user_id())
            .bind(prefs.cleanliness_level.get() as i16)
            .bind(prefs.noise_level.get() as i16)
            .bind(prefs.sleep_schedule.as_str())
            .bind(prefs.diet_preferences.as_str())
            .bind(prefs.smoking_preferences.as_str())
            .bind(prefs.pets_preferences.as_str())
            .bind(prefs.guest_preferences.as_str())
            .bind(prefs.age_range.min() as i16)
            .bind(prefs.age_range.max() as i16)
            .bind(interests_vec(record))
            .bind(prefs.additional_notes.as_deref())
            .bind(record.fingerprint())
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "preferences for user {}",
                record.user_id()
            )));
        }
        Ok(())
    }

    async fn delete_preferences(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM roommate_preferences WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_existing_match(
        &self,
        user_id_a: &str,
        user_id_b: &str,
    ) -> Result<Option<Match>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {} FROM roommate_matches
            WHERE (user_id_a = $1 AND user_id_b = $2)
               OR (user_id_a = $2 AND user_id_b = $1)
            "#,
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id_a)
            .bind(user_id_b)
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        Ok(row.as_ref().map(match_from_row).transpose()?)
    }

    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, RepositoryError> {
        let query = format!("SELECT {} FROM roommate_matches WHERE id = $1", MATCH_COLUMNS);

        let row = sqlx::query(&query)
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        Ok(row.as_ref().map(match_from_row).transpose()?)
    }

    async fn list_matches_for_user(&self, user_id: &str) -> Result<Vec<Match>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {} FROM roommate_matches
            WHERE user_id_a = $1 OR user_id_b = $1
            ORDER BY date_matched DESC, id
            "#,
            MATCH_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        let matches: Result<Vec<Match>, PostgresError> = rows.iter().map(match_from_row).collect();
        Ok(matches?)
    }

    async fn insert_match(&self, new_match: &Match) -> Result<Match, RepositoryError> {
        // ON CONFLICT without a target also covers the sorted-pair unique index
        let query = format!(
            r#"
            INSERT INTO roommate_matches ({columns})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT DO NOTHING
            RETURNING {columns}
            "#,
            columns = MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(new_match.id)
            .bind(&new_match.user_id_a)
            .bind(&new_match.user_id_b)
            .bind(new_match.compatibility_score as i16)
            .bind(new_match.status.as_str())
            .bind(new_match.date_matched)
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        match row {
            Some(row) => Ok(match_from_row(&row)?),
            None => Err(RepositoryError::DuplicateMatch(
                new_match.user_id_a.clone(),
                new_match.user_id_b.clone(),
            )),
        }
    }

    async fn update_match_status(
        &self,
        match_id: Uuid,
        expected: MatchStatus,
        status: MatchStatus,
    ) -> Result<Option<Match>, RepositoryError> {
        let query = format!(
            r#"
            UPDATE roommate_matches SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(match_id)
            .bind(expected.as_str())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        if let Some(row) = row {
            return Ok(Some(match_from_row(&row)?));
        }

        // Distinguish a lost race from a missing row
        match self.get_match(match_id).await? {
            Some(_) => Ok(None),
            None => Err(RepositoryError::NotFound(format!("match {}", match_id))),
        }
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, RepositoryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| PostgresError::from(e).into())
    }
}
