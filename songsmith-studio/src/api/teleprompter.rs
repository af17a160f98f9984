//! Teleprompter SSE stream
//!
//! GET /api/users/{user_id}/drafts/{draft_id}/teleprompter?speed=
//!
//! Plays a draft from the top and sends a `Frame` event whenever the current
//! line changes. The stream ends after the `Finished` frame.
//!
//! The client pauses by closing the stream; there is no inbound control
//! channel on SSE.

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use songsmith_common::sse::{json_event, keep_alive};
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::extract::{Path, Query};
use crate::{
    error::{ApiError, ApiResult},
    services::{Teleprompter, TeleprompterStatus},
    session::Session,
    AppState,
};

/// Interval between position updates
const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
pub struct TeleprompterQuery {
    /// 1..=100, clamped; defaults to the stored setting
    pub speed: Option<i64>,
}

pub async fn teleprompter_stream(
    State(state): State<AppState>,
    Path((user_id, draft_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<TeleprompterQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let session = Session::resume(&state.db, user_id).await?;
    let draft = crate::db::drafts::get_draft(&state.db, session.user_id, draft_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Draft not found: {}", draft_id)))?;

    let speed = match query.speed {
        Some(speed) => speed,
        None => crate::db::settings::get_teleprompter_default_speed(&state.db).await? as i64,
    };

    let mut teleprompter = Teleprompter::new();
    teleprompter.load(&draft);
    teleprompter.set_speed(speed);
    let playing = teleprompter.play();

    info!(
        user_id = %user_id,
        draft_id = %draft_id,
        speed = teleprompter.speed(),
        playing,
        "Teleprompter started"
    );

    let stream = async_stream::stream! {
        let mut frame = teleprompter.frame();
        if let Some(event) = json_event("Frame", &frame) {
            yield Ok(event);
        }

        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.tick().await;

        while teleprompter.status() == TeleprompterStatus::Scrolling {
            interval.tick().await;
            teleprompter.tick(TICK_INTERVAL);

            let next = teleprompter.frame();
            if next.line_index != frame.line_index || next.status != frame.status {
                debug!(draft_id = %draft_id, line_index = next.line_index, "Teleprompter frame");
                if let Some(event) = json_event("Frame", &next) {
                    yield Ok(event);
                }
            }
            frame = next;
        }
    };

    Ok(Sse::new(stream).keep_alive(keep_alive()))
}

pub fn teleprompter_routes() -> Router<AppState> {
    Router::new().route(
        "/api/users/:user_id/drafts/:draft_id/teleprompter",
        get(teleprompter_stream),
    )
}
