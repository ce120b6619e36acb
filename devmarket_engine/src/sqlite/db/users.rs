use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User, UserId};

/// Inserts the user, or updates the profile fields of an existing user with the same id.
pub async fn upsert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user: User = sqlx::query_as(
        r#"
            INSERT INTO users (id, email, full_name, bio, avatar_url, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                full_name = excluded.full_name,
                bio = excluded.bio,
                avatar_url = excluded.avatar_url
            RETURNING *;
        "#,
    )
    .bind(user.id)
    .bind(user.email)
    .bind(user.full_name)
    .bind(user.bio)
    .bind(user.avatar_url)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Profile for user {} saved", user.id);
    Ok(user)
}

pub async fn fetch_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id.as_str()).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn user_exists(user_id: &UserId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1").bind(user_id.as_str()).fetch_one(conn).await?;
    Ok(count > 0)
}
