use sqlx::SqlitePool;

use crate::errors::AppError;
use super::types::{NewUser, User};

const USER_SELECT: &str = "\
SELECT id, username, password, role, joined, graduated, totp_secret, totp_active FROM users";

pub async fn create(pool: &SqlitePool, new: &NewUser) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3) RETURNING id",
    )
    .bind(&new.username)
    .bind(&new.password)
    .bind(new.role.as_str())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let sql = format!("{USER_SELECT} WHERE id = ?1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let sql = format!("{USER_SELECT} WHERE username = ?1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, AppError> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

pub async fn update_password(pool: &SqlitePool, id: i64, hash: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET password = ?1 WHERE id = ?2")
        .bind(hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_joined(pool: &SqlitePool, id: i64, label: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET joined = ?1 WHERE id = ?2")
        .bind(label)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_graduated(pool: &SqlitePool, id: i64, label: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET graduated = ?1 WHERE id = ?2")
        .bind(label)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Role changes are administrative tooling only; no route calls this.
pub async fn set_role(pool: &SqlitePool, id: i64, role: crate::auth::gate::Role) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET role = ?1 WHERE id = ?2")
        .bind(role.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Two-factor state: `secret` is stored with `active`; disabling keeps a
/// rotated secret so an old enrollment cannot be revived.
pub async fn set_totp(
    pool: &SqlitePool,
    id: i64,
    secret: &str,
    active: bool,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET totp_secret = ?1, totp_active = ?2 WHERE id = ?3")
        .bind(secret)
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
