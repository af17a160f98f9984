//! Collected line handlers

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use songsmith_common::db::CollectedLine;
use songsmith_common::events::{ChangeKind, Collection};
use tracing::info;
use uuid::Uuid;

use crate::api::extract::{Json, Path};
use crate::{
    error::{ApiError, ApiResult},
    session::Session,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub content: String,
}

/// GET /api/users/{user_id}/lines
pub async fn list_lines(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CollectedLine>>> {
    let session = Session::resume(&state.db, user_id).await?;
    Ok(Json(
        crate::db::lines::list_lines(&state.db, session.user_id).await?,
    ))
}

/// POST /api/users/{user_id}/lines
pub async fn add_line(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AddLineRequest>,
) -> ApiResult<(StatusCode, Json<CollectedLine>)> {
    let session = Session::resume(&state.db, user_id).await?;
    let line = crate::db::lines::add_line(&state.db, session.user_id, &request.content).await?;

    info!(user_id = %user_id, line_id = %line.id, "Line collected");
    state.notify_change(
        Collection::Lines,
        Some(user_id),
        line.id.to_string(),
        ChangeKind::Added,
    );

    Ok((StatusCode::CREATED, Json(line)))
}

/// DELETE /api/users/{user_id}/lines/{line_id}
pub async fn delete_line(
    State(state): State<AppState>,
    Path((user_id, line_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let session = Session::resume(&state.db, user_id).await?;
    if !crate::db::lines::delete_line(&state.db, session.user_id, line_id).await? {
        return Err(ApiError::NotFound(format!("Line not found: {}", line_id)));
    }

    state.notify_change(
        Collection::Lines,
        Some(user_id),
        line_id.to_string(),
        ChangeKind::Removed,
    );

    Ok(StatusCode::NO_CONTENT)
}

pub fn line_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:user_id/lines", get(list_lines).post(add_line))
        .route("/api/users/:user_id/lines/:line_id", delete(delete_line))
}
