//! Server-Sent Events
//!
//! `/events` is a heartbeat-only connection monitor. The per-user stream
//! first sends a `Snapshot` of every collection, then a fresh `Snapshot`
//! whenever one of them changes, plus generation status events.

use crate::{error::ApiResult, session::{Session, SubscriptionUpdate, ALL_COLLECTIONS}, AppState};
use crate::api::extract::Path;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use songsmith_common::events::Collection;
use songsmith_common::sse::{json_event, keep_alive};
use std::convert::Infallible;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// GET /events - heartbeat-only SSE stream
pub async fn event_stream() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    songsmith_common::sse::create_heartbeat_sse_stream("songsmith-studio")
}

async fn snapshot_event(state: &AppState, session: &Session, collection: Collection) -> Option<Event> {
    match session.snapshot(&state.db, collection).await {
        Ok(snapshot) => json_event("Snapshot", &snapshot),
        Err(e) => {
            warn!(user_id = %session.user_id, collection = collection.as_str(), "Snapshot failed: {}", e);
            None
        }
    }
}

/// GET /api/users/{user_id}/events - live collections for one user
///
/// 404 for unknown users. Closing the connection ends the subscription.
pub async fn user_event_stream(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let session = Session::resume(&state.db, user_id).await?;
    let mut subscription = session.subscribe(&state.event_bus, &ALL_COLLECTIONS);
    info!(user_id = %user_id, "New SSE client connected to live collections");

    let stream = async_stream::stream! {
        for collection in ALL_COLLECTIONS {
            if let Some(event) = snapshot_event(&state, &session, collection).await {
                yield Ok(event);
            }
        }

        while let Some(update) = subscription.next_update().await {
            match update {
                SubscriptionUpdate::Refresh(collections) => {
                    for collection in collections {
                        debug!(user_id = %user_id, collection = collection.as_str(), "SSE: Sending snapshot");
                        if let Some(event) = snapshot_event(&state, &session, collection).await {
                            yield Ok(event);
                        }
                    }
                }
                SubscriptionUpdate::Generation(event) => {
                    if let Some(event) = json_event(event.event_type(), &event) {
                        yield Ok(event);
                    }
                }
            }
        }

        subscription.unsubscribe();
    };

    Ok(Sse::new(stream).keep_alive(keep_alive()))
}
