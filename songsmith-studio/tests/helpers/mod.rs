//! Shared test helpers
//!
//! Builds an app on a temporary database with a scripted text generator,
//! and spawns local stub servers for the outbound clients.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use songsmith_common::events::EventBus;
use songsmith_studio::services::{TextGenerator, ThesaurusClient};
use songsmith_studio::{build_router, AppState};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower::util::ServiceExt;

/// Text generator that answers with a settable reply and records prompts
#[derive(Default)]
pub struct ScriptedGenerator {
    reply: Mutex<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = reply.to_string();
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> String {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.lock().unwrap().clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub generator: Arc<ScriptedGenerator>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_thesaurus("http://127.0.0.1:9").await
    }

    pub async fn with_thesaurus(thesaurus_endpoint: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let pool = songsmith_common::db::init_database(&dir.path().join("songsmith.db"))
            .await
            .unwrap();

        let generator = Arc::new(ScriptedGenerator::default());
        let state = AppState::new(
            pool,
            EventBus::new(100),
            generator.clone(),
            Arc::new(ThesaurusClient::new(thesaurus_endpoint).unwrap()),
            Arc::new(RwLock::new(None)),
        );

        Self {
            router: build_router(state.clone()),
            state,
            generator,
            _dir: dir,
        }
    }

    /// Send a request and decode the JSON body (`Null` when empty)
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    /// POST a raw body with the JSON content type
    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Anonymous sign-in, returns the user id
    pub async fn sign_in(&self) -> String {
        let (status, body) = self.send(Method::POST, "/api/session", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["user_id"].as_str().unwrap().to_string()
    }
}

/// Serve `router` on an ephemeral local port; returns its base URL
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
