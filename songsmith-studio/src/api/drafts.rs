//! Lyric draft handlers
//!
//! Every route resolves the session first, so unknown users get 404.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use songsmith_common::db::Draft;
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
pub struct CreateDraftRequest {
    pub title: String,
    pub content: String,
}

/// Fields left out keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateDraftRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// GET /api/users/{user_id}/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Draft>>> {
    let session = Session::resume(&state.db, user_id).await?;
    let drafts = crate::db::drafts::list_drafts(&state.db, session.user_id).await?;
    Ok(Json(drafts))
}

/// POST /api/users/{user_id}/drafts
pub async fn create_draft(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CreateDraftRequest>,
) -> ApiResult<(StatusCode, Json<Draft>)> {
    let session = Session::resume(&state.db, user_id).await?;
    let draft =
        crate::db::drafts::create_draft(&state.db, session.user_id, &request.title, &request.content)
            .await?;

    info!(user_id = %user_id, draft_id = %draft.id, "Draft created");
    state.notify_change(
        Collection::Drafts,
        Some(user_id),
        draft.id.to_string(),
        ChangeKind::Added,
    );

    Ok((StatusCode::CREATED, Json(draft)))
}

/// GET /api/users/{user_id}/drafts/{draft_id}
pub async fn get_draft(
    State(state): State<AppState>,
    Path((user_id, draft_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Draft>> {
    let session = Session::resume(&state.db, user_id).await?;
    crate::db::drafts::get_draft(&state.db, session.user_id, draft_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Draft not found: {}", draft_id)))
}

/// PATCH /api/users/{user_id}/drafts/{draft_id}
pub async fn update_draft(
    State(state): State<AppState>,
    Path((user_id, draft_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateDraftRequest>,
) -> ApiResult<Json<Draft>> {
    if request.title.is_none() && request.content.is_none() {
        return Err(ApiError::BadRequest(
            "Nothing to update: provide title and/or content".to_string(),
        ));
    }

    let session = Session::resume(&state.db, user_id).await?;
    let draft = crate::db::drafts::update_draft(
        &state.db,
        session.user_id,
        draft_id,
        request.title.as_deref(),
        request.content.as_deref(),
    )
    .await?;

    info!(user_id = %user_id, draft_id = %draft_id, "Draft updated");
    state.notify_change(
        Collection::Drafts,
        Some(user_id),
        draft_id.to_string(),
        ChangeKind::Modified,
    );

    Ok(Json(draft))
}

/// DELETE /api/users/{user_id}/drafts/{draft_id}
///
/// Returns 204 No Content.
pub async fn delete_draft(
    State(state): State<AppState>,
    Path((user_id, draft_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let session = Session::resume(&state.db, user_id).await?;
    if !crate::db::drafts::delete_draft(&state.db, session.user_id, draft_id).await? {
        return Err(ApiError::NotFound(format!("Draft not found: {}", draft_id)));
    }

    info!(user_id = %user_id, draft_id = %draft_id, "Draft deleted");
    state.notify_change(
        Collection::Drafts,
        Some(user_id),
        draft_id.to_string(),
        ChangeKind::Removed,
    );

    Ok(StatusCode::NO_CONTENT)
}

pub fn draft_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/:user_id/drafts",
            get(list_drafts).post(create_draft),
        )
        .route(
            "/api/users/:user_id/drafts/:draft_id",
            get(get_draft).patch(update_draft).delete(delete_draft),
        )
}
