//! Settings database operations
//!
//! Key-value accessors for the `settings` table.

use songsmith_common::{Error, Result};
use sqlx::{Pool, Sqlite};

/// Database key of the generation API key
pub const GENERATION_API_KEY: &str = "generation_api_key";

/// Get generation API key from database
///
/// **Returns:** Some(key) if exists, None if not set
pub async fn get_generation_api_key(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting::<String>(db, GENERATION_API_KEY).await
}

/// Set generation API key in database
pub async fn set_generation_api_key(db: &Pool<Sqlite>, key: String) -> Result<()> {
    set_setting(db, GENERATION_API_KEY, key).await
}

/// Model name used for generation
pub async fn get_generation_model(db: &Pool<Sqlite>) -> Result<Option<String>> {
    get_setting(db, "generation_model").await
}

/// Number of attempts per generation call
///
/// **Default:** 3
pub async fn get_generation_max_attempts(db: &Pool<Sqlite>) -> Result<u32> {
    get_setting(db, "generation_max_attempts")
        .await
        .map(|opt| opt.unwrap_or(3))
}

/// Base delay of the exponential backoff in milliseconds
///
/// **Default:** 1000
pub async fn get_generation_backoff_base_ms(db: &Pool<Sqlite>) -> Result<u64> {
    get_setting(db, "generation_backoff_base_ms")
        .await
        .map(|opt| opt.unwrap_or(1000))
}

/// Teleprompter speed used when a client does not ask for one
///
/// **Default:** 25
pub async fn get_teleprompter_default_speed(db: &Pool<Sqlite>) -> Result<u8> {
    get_setting(db, "teleprompter_default_speed")
        .await
        .map(|opt| opt.unwrap_or(25))
}

/// Generic setting getter
pub async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(Option<String>,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((Some(value),)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

/// Generic setting setter (upsert)
pub async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_api_key_round_trip() {
        let pool = test_pool().await;
        assert_eq!(get_generation_api_key(&pool).await.unwrap(), None);

        set_generation_api_key(&pool, "abc".to_string()).await.unwrap();
        set_generation_api_key(&pool, "def".to_string()).await.unwrap();
        assert_eq!(
            get_generation_api_key(&pool).await.unwrap().as_deref(),
            Some("def")
        );
    }

    #[tokio::test]
    async fn test_numeric_defaults_when_unset() {
        let pool = test_pool().await;
        assert_eq!(get_generation_max_attempts(&pool).await.unwrap(), 3);
        assert_eq!(get_generation_backoff_base_ms(&pool).await.unwrap(), 1000);
        assert_eq!(get_teleprompter_default_speed(&pool).await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_unparseable_value_is_config_error() {
        let pool = test_pool().await;
        set_setting(&pool, "generation_max_attempts", "viele").await.unwrap();
        assert!(matches!(
            get_generation_max_attempts(&pool).await,
            Err(Error::Config(_))
        ));
    }
}
