//! Document models
//!
//! Field names serialize in camelCase (`createdAt`) to match what clients of
//! the former document store expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's private saved song text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Community-submitted lyric, keyed by the hash of its normalized content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLyric {
    /// 64 hex chars, see [`crate::hashing::reference_id`]
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A single line kept for later use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedLine {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Anonymous identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}
