//! Writing tools: rhymes, creative prompts, synonyms

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::{Json, Query};
use crate::{
    error::{ApiError, ApiResult},
    services::prompt::CreativeTool,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct WordQuery {
    pub word: Option<String>,
}

impl WordQuery {
    fn required_word(self) -> ApiResult<String> {
        match self.word.as_deref().map(str::trim) {
            Some(word) if !word.is_empty() => Ok(word.to_string()),
            _ => Err(ApiError::BadRequest(
                "Query parameter 'word' must not be empty".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RhymesResponse {
    pub word: String,
    pub rhymes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreativeRequest {
    pub tool: CreativeTool,
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct CreativeResponse {
    pub tool: CreativeTool,
    pub results: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SynonymsResponse {
    pub word: String,
    pub synonyms: Vec<String>,
}

/// GET /api/tools/rhymes?word=
pub async fn find_rhymes(
    State(state): State<AppState>,
    Query(query): Query<WordQuery>,
) -> ApiResult<Json<RhymesResponse>> {
    let word = query.required_word()?;
    let rhymes = state.songwriter.find_rhymes(&word).await?;
    Ok(Json(RhymesResponse { word, rhymes }))
}

/// POST /api/tools/creative
pub async fn run_creative_tool(
    State(state): State<AppState>,
    Json(request): Json<CreativeRequest>,
) -> ApiResult<Json<CreativeResponse>> {
    let results = state
        .songwriter
        .run_creative_tool(request.tool, &request.input)
        .await?;
    Ok(Json(CreativeResponse {
        tool: request.tool,
        results,
    }))
}

/// GET /api/tools/synonyms?word=
///
/// Lookup failures answer 200 with the single notice entry.
pub async fn find_synonyms(
    State(state): State<AppState>,
    Query(query): Query<WordQuery>,
) -> ApiResult<Json<SynonymsResponse>> {
    let word = query.required_word()?;
    let synonyms = state.thesaurus.synonyms(&word).await;
    Ok(Json(SynonymsResponse { word, synonyms }))
}

pub fn tool_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tools/rhymes", get(find_rhymes))
        .route("/api/tools/creative", post(run_creative_tool))
        .route("/api/tools/synonyms", get(find_synonyms))
}
