//! Settings API endpoint
//!
//! Provides POST /api/settings/generation_api_key

use crate::{ApiError, ApiResult, AppState};
use crate::api::extract::Json;
use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request payload for setting the generation API key
#[derive(Debug, Deserialize)]
pub struct SetApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct SetApiKeyResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/settings/generation_api_key handler
///
/// **Request:** `{"api_key": "your-key"}`
/// **Response:** `{"success": true, "message": "..."}`
///
/// The database is the authoritative store; the running client picks the new
/// key up on its next call.
///
/// **Errors:**
/// - 400 Bad Request: Empty or whitespace-only key
/// - 500 Internal Server Error: Database write failure
pub async fn set_generation_api_key(
    State(state): State<AppState>,
    Json(payload): Json<SetApiKeyRequest>,
) -> ApiResult<Json<SetApiKeyResponse>> {
    if !crate::config::is_valid_key(&payload.api_key) {
        return Err(ApiError::BadRequest(
            "API key cannot be empty or whitespace-only".to_string(),
        ));
    }

    let key = payload.api_key.trim().to_string();
    crate::db::settings::set_generation_api_key(&state.db, key.clone())
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to save API key to database: {}", e)))?;

    *state.generation_api_key.write().await = Some(key);
    info!("Generation API key configured via settings API");

    Ok(Json(SetApiKeyResponse {
        success: true,
        message: "Generation API key configured successfully".to_string(),
    }))
}

pub fn settings_routes() -> Router<AppState> {
    Router::new().route(
        "/api/settings/generation_api_key",
        post(set_generation_api_key),
    )
}
