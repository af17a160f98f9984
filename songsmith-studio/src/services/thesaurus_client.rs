//! Synonym lookup against the OpenThesaurus search API
//!
//! `GET {endpoint}/synonyme/search?q={word}&format=application/json`,
//! flattening `synsets[].terms[].term` in response order.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_THESAURUS_ENDPOINT: &str = "https://www.openthesaurus.de";

/// Single-entry result returned when a lookup fails
pub const SYNONYM_ERROR_NOTICE: &str = "Fehler beim Laden der Synonyme.";

const USER_AGENT: &str = concat!("Songsmith/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ThesaurusError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}")]
    Api(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    synsets: Vec<Synset>,
}

#[derive(Debug, Deserialize)]
struct Synset {
    #[serde(default)]
    terms: Vec<Term>,
}

#[derive(Debug, Deserialize)]
struct Term {
    term: String,
}

pub struct ThesaurusClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl ThesaurusClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ThesaurusError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ThesaurusError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Look up synonyms for a word
    pub async fn lookup(&self, word: &str) -> Result<Vec<String>, ThesaurusError> {
        let url = format!("{}/synonyme/search", self.endpoint);
        debug!(word, "Thesaurus lookup");

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", word), ("format", "application/json")])
            .send()
            .await
            .map_err(|e| ThesaurusError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThesaurusError::Api(status.as_u16()));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ThesaurusError::Parse(e.to_string()))?;

        Ok(parsed
            .synsets
            .into_iter()
            .flat_map(|synset| synset.terms.into_iter().map(|t| t.term))
            .collect())
    }

    /// Look up synonyms; failures yield [`SYNONYM_ERROR_NOTICE`]
    pub async fn synonyms(&self, word: &str) -> Vec<String> {
        match self.lookup(word).await {
            Ok(terms) => terms,
            Err(e) => {
                warn!(word, "Synonym lookup failed: {}", e);
                vec![SYNONYM_ERROR_NOTICE.to_string()]
            }
        }
    }
}
