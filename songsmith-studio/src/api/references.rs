//! Shared reference lyric handlers
//!
//! Submissions are deduplicated by content hash: a repeat submission answers
//! 200 with `created: false` and the existing document.

use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde::{Deserialize, Serialize};
use songsmith_common::db::ReferenceLyric;
use songsmith_common::events::{ChangeKind, Collection};
use tracing::{debug, info};

use crate::api::extract::Json;
use crate::{error::ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SubmitReferenceRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitReferenceResponse {
    pub created: bool,
    pub reference: ReferenceLyric,
}

/// GET /api/references
pub async fn list_references(State(state): State<AppState>) -> ApiResult<Json<Vec<ReferenceLyric>>> {
    Ok(Json(crate::db::references::list_references(&state.db).await?))
}

/// POST /api/references
///
/// 201 when stored, 200 when the text was already present.
pub async fn submit_reference(
    State(state): State<AppState>,
    Json(request): Json<SubmitReferenceRequest>,
) -> ApiResult<(StatusCode, Json<SubmitReferenceResponse>)> {
    let (reference, created) =
        crate::db::references::submit_reference(&state.db, &request.content).await?;

    let status = if created {
        info!(reference_id = %reference.id, "Reference lyric stored");
        state.notify_change(
            Collection::References,
            None,
            reference.id.clone(),
            ChangeKind::Added,
        );
        StatusCode::CREATED
    } else {
        debug!(reference_id = %reference.id, "Duplicate reference lyric ignored");
        StatusCode::OK
    };

    Ok((status, Json(SubmitReferenceResponse { created, reference })))
}

pub fn reference_routes() -> Router<AppState> {
    Router::new().route("/api/references", get(list_references).post(submit_reference))
}
