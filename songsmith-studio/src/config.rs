//! Configuration resolution for songsmith-studio
//!
//! Generation API key priority: Database → ENV → TOML.
//! Model, endpoint and retry settings come from TOML, then the database
//! settings table, then compiled defaults.

use crate::services::generation_client::{GenerationConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::services::thesaurus_client::DEFAULT_THESAURUS_ENDPOINT;
use songsmith_common::config::TomlConfig;
use songsmith_common::Result;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

/// Environment variable holding the generation API key
pub const GENERATION_API_KEY_ENV: &str = "SONGSMITH_GENERATION_API_KEY";

/// Resolve the generation API key from 3-tier configuration
///
/// **Priority:** Database → ENV → TOML
///
/// Returns `None` when no source has a usable key. The service still starts;
/// generation calls then reply with the error marker.
pub async fn resolve_generation_api_key(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    let db_key = crate::db::settings::get_generation_api_key(db)
        .await?
        .filter(|k| is_valid_key(k));
    let env_key = std::env::var(GENERATION_API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .generation_api_key
        .clone()
        .filter(|k| is_valid_key(k));

    let sources: Vec<&str> = [
        db_key.as_ref().map(|_| "database"),
        env_key.as_ref().map(|_| "environment"),
        toml_key.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    // Warn if multiple sources (potential misconfiguration)
    if sources.len() > 1 {
        warn!(
            "Generation API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(key) = db_key {
        info!("Generation API key loaded from database");
        return Ok(Some(key));
    }
    if let Some(key) = env_key {
        info!("Generation API key loaded from environment variable");
        return Ok(Some(key));
    }
    if let Some(key) = toml_key {
        info!("Generation API key loaded from TOML config");
        return Ok(Some(key));
    }

    warn!(
        "Generation API key not configured. Set it via POST /api/settings/generation_api_key, \
         the {} environment variable, or generation_api_key in the TOML config.",
        GENERATION_API_KEY_ENV
    );
    Ok(None)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Build the generation client settings
pub async fn load_generation_config(
    db: &Pool<Sqlite>,
    toml_config: &TomlConfig,
) -> Result<GenerationConfig> {
    let model = match &toml_config.generation_model {
        Some(model) if !model.trim().is_empty() => model.clone(),
        _ => crate::db::settings::get_generation_model(db)
            .await?
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
    };
    let endpoint = toml_config
        .generation_endpoint
        .clone()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let max_attempts = crate::db::settings::get_generation_max_attempts(db).await?;
    let backoff_ms = crate::db::settings::get_generation_backoff_base_ms(db).await?;

    info!(
        model = %model,
        endpoint = %endpoint,
        max_attempts,
        backoff_ms,
        "Generation client configured"
    );

    Ok(GenerationConfig {
        model,
        endpoint,
        max_attempts,
        backoff_base: songsmith_common::time::millis_to_duration(backoff_ms),
        ..GenerationConfig::default()
    })
}

/// Thesaurus base URL: TOML, else the public OpenThesaurus instance
pub fn thesaurus_endpoint(toml_config: &TomlConfig) -> String {
    toml_config
        .thesaurus_endpoint
        .clone()
        .unwrap_or_else(|| DEFAULT_THESAURUS_ENDPOINT.to_string())
}
