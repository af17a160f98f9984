//! # Songsmith Common Library
//!
//! Shared code for the Songsmith songwriting assistant:
//! - Database initialization and document models
//! - Event types (SongsmithEvent) and the EventBus behind live subscriptions
//! - Configuration loading and root folder resolution
//! - Content hashing for reference lyric deduplication
//! - SSE helpers and small utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod hashing;
pub mod sse;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
