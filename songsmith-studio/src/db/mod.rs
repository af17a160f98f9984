//! Database access for the studio service
//!
//! Schema creation lives in `songsmith_common::db`; these modules hold the
//! per-collection queries. Ids and timestamps are stored as TEXT.

pub mod drafts;
pub mod lines;
pub mod references;
pub mod settings;
pub mod users;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use songsmith_common::{Error, Result};

/// Current time at storage precision
///
/// Documents returned from a create call compare equal to the same
/// documents read back later.
pub(crate) fn now() -> DateTime<Utc> {
    songsmith_common::time::now().trunc_subsecs(6)
}

/// Format a timestamp for storage
///
/// Fixed precision keeps lexical order equal to chronological order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a timestamp read from a TEXT column
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Corrupt timestamp '{}' in database: {}", s, e)))
}

/// Reject empty or whitespace-only text
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    // One connection: every in-memory connection is its own database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    songsmith_common::db::create_schema(&pool).await.unwrap();
    pool
}
