//! Shared public reference lyrics
//!
//! Write-once by content hash: the document id is
//! [`songsmith_common::hashing::reference_id`] of the submitted text, so a
//! second submission of the same (case/whitespace-normalized) text finds the
//! existing row instead of inserting.

use super::{format_timestamp, parse_timestamp, require_text};
use songsmith_common::db::ReferenceLyric;
use songsmith_common::{hashing, Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn reference_from_row(row: &SqliteRow) -> Result<ReferenceLyric> {
    let created_at: String = row.get("created_at");
    Ok(ReferenceLyric {
        id: row.get("id"),
        content: row.get("content"),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Submit a reference lyric
///
/// Returns the stored document and whether this call created it.
pub async fn submit_reference(pool: &SqlitePool, content: &str) -> Result<(ReferenceLyric, bool)> {
    require_text("content", content)?;

    let id = hashing::reference_id(content);
    let created_at = super::now();

    let result = sqlx::query(
        "INSERT OR IGNORE INTO reference_lyrics (id, content, created_at) VALUES (?, ?, ?)",
    )
    .bind(&id)
    .bind(content.trim())
    .bind(format_timestamp(&created_at))
    .execute(pool)
    .await?;
    let created = result.rows_affected() > 0;

    let reference = get_reference(pool, &id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Reference {} vanished after insert", id)))?;

    Ok((reference, created))
}

pub async fn get_reference(pool: &SqlitePool, id: &str) -> Result<Option<ReferenceLyric>> {
    let row = sqlx::query("SELECT id, content, created_at FROM reference_lyrics WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(reference_from_row).transpose()
}

/// All reference lyrics, oldest first
pub async fn list_references(pool: &SqlitePool) -> Result<Vec<ReferenceLyric>> {
    let rows = sqlx::query(
        "SELECT id, content, created_at FROM reference_lyrics ORDER BY created_at, rowid",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(reference_from_row).collect()
}
