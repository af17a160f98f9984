//! Song generation handlers
//!
//! POST /api/users/{user_id}/generate, POST /api/users/{user_id}/generate/save,
//! POST /api/ideas/random

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use songsmith_common::db::Draft;
use uuid::Uuid;

use crate::api::extract::{Json, Path};
use crate::{
    error::ApiResult,
    services::prompt::SongRequest,
    services::{GenerationOutcome, StatusMessage},
    session::Session,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SaveSongRequest {
    pub idea: String,
    pub songtext: String,
}

#[derive(Debug, Serialize)]
pub struct SaveSongResponse {
    pub draft: Draft,
    pub message: StatusMessage,
}

#[derive(Debug, Serialize)]
pub struct RandomIdeaResponse {
    pub idea: String,
}

/// POST /api/users/{user_id}/generate
///
/// A failed generation is still 200: the outcome carries the error message
/// and no song. 409 while another generation runs for the same user.
pub async fn generate_song(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SongRequest>,
) -> ApiResult<Json<GenerationOutcome>> {
    let session = Session::resume(&state.db, user_id).await?;
    let outcome = state
        .songwriter
        .generate_song(session.user_id, &request)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/users/{user_id}/generate/save
///
/// Store the generated songtext as a draft titled with the idea.
pub async fn save_song(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SaveSongRequest>,
) -> ApiResult<(StatusCode, Json<SaveSongResponse>)> {
    let session = Session::resume(&state.db, user_id).await?;
    let (draft, message) = state
        .songwriter
        .save_song(session.user_id, &request.idea, &request.songtext)
        .await?;
    Ok((StatusCode::CREATED, Json(SaveSongResponse { draft, message })))
}

/// POST /api/ideas/random
pub async fn random_idea(State(state): State<AppState>) -> ApiResult<Json<RandomIdeaResponse>> {
    let idea = state.songwriter.random_idea().await?;
    Ok(Json(RandomIdeaResponse { idea }))
}

pub fn generator_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:user_id/generate", post(generate_song))
        .route("/api/users/:user_id/generate/save", post(save_song))
        .route("/api/ideas/random", post(random_idea))
}
