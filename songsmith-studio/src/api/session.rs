//! Anonymous sign-in
//!
//! POST /api/session, GET /api/session/{user_id}

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::extract::{Json, Path};
use crate::{error::ApiResult, session::Session, AppState};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
}

/// POST /api/session
///
/// Create a new anonymous identity. Returns 201 Created.
pub async fn sign_in(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let session = Session::sign_in_anonymously(&state.db, &state.event_bus).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user_id: session.user_id,
        }),
    ))
}

/// GET /api/session/{user_id}
///
/// Resume an earlier identity; 404 if it was never issued.
pub async fn resume(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<SessionResponse>> {
    let session = Session::resume(&state.db, user_id).await?;
    Ok(Json(SessionResponse {
        user_id: session.user_id,
    }))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", post(sign_in))
        .route("/api/session/:user_id", get(resume))
}
