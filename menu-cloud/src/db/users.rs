//! Login users and their claims

use shared::error::ErrorCode;
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::error::{ServiceResult, on_unique};

#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_enabled: bool,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, BoxError> {
    let user = sqlx::query_as(
        "SELECT id, email, password_hash, is_enabled FROM users WHERE email = $1 AND deleted_at IS NULL",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, BoxError> {
    let user = sqlx::query_as(
        "SELECT id, email, password_hash, is_enabled FROM users WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// `None` when the user does not exist (or was deleted)
pub async fn is_enabled(pool: &PgPool, id: i64) -> Result<Option<bool>, BoxError> {
    let enabled = sqlx::query_scalar(
        "SELECT is_enabled FROM users WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(enabled)
}

/// All claims of a user as `(claim_type, claim_value)`
pub async fn claims(pool: &PgPool, user_id: i64) -> Result<Vec<(String, String)>, BoxError> {
    let rows = sqlx::query_as("SELECT claim_type, claim_value FROM user_claims WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert a user; a live duplicate email maps to `EmailExists`.
pub async fn create(
    conn: &mut PgConnection,
    email: &str,
    password_hash: &str,
    now: i64,
) -> ServiceResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, is_enabled, created_at, updated_at)
        VALUES ($1, $2, $3, TRUE, $4, $4)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(on_unique(ErrorCode::EmailExists))?;
    Ok(id)
}

/// Set (insert or overwrite) one claim
pub async fn set_claim(
    conn: &mut PgConnection,
    user_id: i64,
    claim_type: &str,
    claim_value: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_claims (user_id, claim_type, claim_value)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, claim_type) DO UPDATE SET claim_value = EXCLUDED.claim_value
        "#,
    )
    .bind(user_id)
    .bind(claim_type)
    .bind(claim_value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn remove_claims(conn: &mut PgConnection, user_ids: &[i64]) -> Result<(), sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(());
    }
    sqlx::query("DELETE FROM user_claims WHERE user_id = ANY($1)")
        .bind(user_ids)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Disable and retire users. The email becomes free for a new account.
pub async fn disable(conn: &mut PgConnection, user_ids: &[i64], now: i64) -> Result<(), sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        UPDATE users SET is_enabled = FALSE, deleted_at = $2, updated_at = $2
        WHERE id = ANY($1) AND deleted_at IS NULL
        "#,
    )
    .bind(user_ids)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_email(
    conn: &mut PgConnection,
    user_id: i64,
    email: &str,
    now: i64,
) -> ServiceResult<()> {
    sqlx::query("UPDATE users SET email = $2, updated_at = $3 WHERE id = $1 AND deleted_at IS NULL")
        .bind(user_id)
        .bind(email)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(on_unique(ErrorCode::EmailExists))?;
    Ok(())
}

/// Returns `false` when the user does not exist
pub async fn update_password(
    pool: &PgPool,
    user_id: i64,
    password_hash: &str,
    now: i64,
) -> Result<bool, BoxError> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
