//! songsmith-studio library interface
//!
//! Exposes the router and services for the binary and integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use services::{SharedApiKey, Songwriter, TextGenerator, ThesaurusClient};
use songsmith_common::events::{ChangeKind, Collection, EventBus, SongsmithEvent};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus behind live subscriptions
    pub event_bus: EventBus,
    /// Generation workflow (owns the text generator)
    pub songwriter: Songwriter,
    /// Synonym lookup
    pub thesaurus: Arc<ThesaurusClient>,
    /// Generation API key, updatable at runtime
    pub generation_api_key: SharedApiKey,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        generator: Arc<dyn TextGenerator>,
        thesaurus: Arc<ThesaurusClient>,
        generation_api_key: SharedApiKey,
    ) -> Self {
        let songwriter = Songwriter::new(db.clone(), event_bus.clone(), generator);
        Self {
            db,
            event_bus,
            songwriter,
            thesaurus,
            generation_api_key,
            startup_time: Utc::now(),
        }
    }

    /// Announce a document change to live subscribers
    pub fn notify_change(
        &self,
        collection: Collection,
        owner: Option<Uuid>,
        document_id: impl Into<String>,
        change: ChangeKind,
    ) {
        self.event_bus.emit_lossy(SongsmithEvent::collection_changed(
            collection,
            owner,
            document_id,
            change,
        ));
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health_routes())
        .merge(api::session_routes())
        .merge(api::draft_routes())
        .merge(api::line_routes())
        .merge(api::reference_routes())
        .merge(api::generator_routes())
        .merge(api::tool_routes())
        .merge(api::settings_routes())
        .merge(api::teleprompter_routes())
        .route("/events", get(api::event_stream))
        .route("/api/users/:user_id/events", get(api::user_event_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
