//! Per-user lyric drafts
//!
//! Every query is scoped by `user_id`; one user can never read, edit or
//! delete another user's draft, even with a known draft id.

use super::{format_timestamp, parse_timestamp, require_text};
use songsmith_common::db::Draft;
use songsmith_common::{uuid_utils, Error, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

fn draft_from_row(row: &SqliteRow) -> Result<Draft> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    Ok(Draft {
        id: uuid_utils::parse(&id)?,
        title: row.get("title"),
        content: row.get("content"),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Store a new draft
pub async fn create_draft(
    pool: &SqlitePool,
    user_id: Uuid,
    title: &str,
    content: &str,
) -> Result<Draft> {
    require_text("title", title)?;
    require_text("content", content)?;

    let draft = Draft {
        id: uuid_utils::generate(),
        title: title.trim().to_string(),
        content: content.to_string(),
        created_at: super::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO drafts (id, user_id, title, content, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(draft.id.to_string())
    .bind(user_id.to_string())
    .bind(&draft.title)
    .bind(&draft.content)
    .bind(format_timestamp(&draft.created_at))
    .execute(pool)
    .await?;

    Ok(draft)
}

/// All drafts of a user, oldest first
pub async fn list_drafts(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Draft>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, content, created_at
        FROM drafts
        WHERE user_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(draft_from_row).collect()
}

pub async fn get_draft(pool: &SqlitePool, user_id: Uuid, draft_id: Uuid) -> Result<Option<Draft>> {
    let row = sqlx::query(
        "SELECT id, title, content, created_at FROM drafts WHERE id = ? AND user_id = ?",
    )
    .bind(draft_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(draft_from_row).transpose()
}

/// Edit title and/or content; fields left `None` keep their value
pub async fn update_draft(
    pool: &SqlitePool,
    user_id: Uuid,
    draft_id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<Draft> {
    if let Some(title) = title {
        require_text("title", title)?;
    }
    if let Some(content) = content {
        require_text("content", content)?;
    }

    let result = sqlx::query(
        r#"
        UPDATE drafts
        SET title = COALESCE(?, title),
            content = COALESCE(?, content)
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(title.map(str::trim))
    .bind(content)
    .bind(draft_id.to_string())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Draft {} not found", draft_id)));
    }

    get_draft(pool, user_id, draft_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Draft {} not found", draft_id)))
}

/// Delete a draft; returns whether a row was removed
pub async fn delete_draft(pool: &SqlitePool, user_id: Uuid, draft_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM drafts WHERE id = ? AND user_id = ?")
        .bind(draft_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
