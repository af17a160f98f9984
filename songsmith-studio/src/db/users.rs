//! Anonymous identities

use super::{format_timestamp, parse_timestamp};
use songsmith_common::db::User;
use songsmith_common::{uuid_utils, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Create a fresh anonymous user
pub async fn create_user(pool: &SqlitePool) -> Result<User> {
    let user = User {
        id: uuid_utils::generate(),
        created_at: super::now(),
    };

    sqlx::query("INSERT INTO users (id, created_at) VALUES (?, ?)")
        .bind(user.id.to_string())
        .bind(format_timestamp(&user.created_at))
        .execute(pool)
        .await?;

    Ok(user)
}

/// Load a user, `None` if the id was never issued
pub async fn get_user(pool: &SqlitePool, user_id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, created_at FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let id: String = row.get("id");
            let created_at: String = row.get("created_at");
            Ok(Some(User {
                id: uuid_utils::parse(&id)?,
                created_at: parse_timestamp(&created_at)?,
            }))
        }
        None => Ok(None),
    }
}
