//! Per-user collected lines (append and delete only)

use super::{format_timestamp, parse_timestamp, require_text};
use songsmith_common::db::CollectedLine;
use songsmith_common::{uuid_utils, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub async fn add_line(pool: &SqlitePool, user_id: Uuid, content: &str) -> Result<CollectedLine> {
    require_text("content", content)?;

    let line = CollectedLine {
        id: uuid_utils::generate(),
        content: content.trim().to_string(),
        created_at: super::now(),
    };

    sqlx::query(
        "INSERT INTO collected_lines (id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(line.id.to_string())
    .bind(user_id.to_string())
    .bind(&line.content)
    .bind(format_timestamp(&line.created_at))
    .execute(pool)
    .await?;

    Ok(line)
}

/// All lines of a user, oldest first
pub async fn list_lines(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<CollectedLine>> {
    let rows = sqlx::query(
        r#"
        SELECT id, content, created_at
        FROM collected_lines
        WHERE user_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<CollectedLine> {
            let id: String = row.get("id");
            let created_at: String = row.get("created_at");
            Ok(CollectedLine {
                id: uuid_utils::parse(&id)?,
                content: row.get("content"),
                created_at: parse_timestamp(&created_at)?,
            })
        })
        .collect()
}

/// Delete a line; returns whether a row was removed
pub async fn delete_line(pool: &SqlitePool, user_id: Uuid, line_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM collected_lines WHERE id = ? AND user_id = ?")
        .bind(line_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
