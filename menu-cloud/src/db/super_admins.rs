//! Super admin accounts

use shared::error::ErrorCode;
use shared::models::{CLAIM_ROLE, ProfileUpdate, Role, SuperAdmin};
use sqlx::PgPool;

use super::{BoxError, users};
use crate::error::ServiceResult;

const SUPER_ADMIN_SELECT: &str = r#"
    SELECT s.id, s.user_id, u.email, s.name, s.surname, s.phone, s.status,
           img.hash AS image, s.created_at, s.updated_at
    FROM super_admins s
    JOIN users u ON u.id = s.user_id
    LEFT JOIN image_files img
        ON img.content_type = 'super_admin' AND img.owner_id = s.id AND img.status = 'active'
"#;

pub async fn find_by_user(pool: &PgPool, user_id: i64) -> Result<Option<SuperAdmin>, BoxError> {
    let sa = sqlx::query_as(&format!(
        "{SUPER_ADMIN_SELECT} WHERE s.user_id = $1 AND s.status <> 'deleted'"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(sa)
}

/// Enabled user with an active super-admin row
pub async fn is_active(pool: &PgPool, user_id: i64) -> Result<bool, BoxError> {
    let active = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM users u
            JOIN super_admins s ON s.user_id = u.id
            WHERE u.id = $1 AND u.deleted_at IS NULL AND u.is_enabled AND s.status = 'active'
        )
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(active)
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    data: &ProfileUpdate,
) -> ServiceResult<SuperAdmin> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        r#"
        UPDATE super_admins SET
            name       = COALESCE($2, name),
            surname    = COALESCE($3, surname),
            phone      = NULLIF(BTRIM(COALESCE($4, phone)), ''),
            updated_at = $5
        WHERE user_id = $1 AND status <> 'deleted'
        "#,
    )
    .bind(user_id)
    .bind(&data.name)
    .bind(&data.surname)
    .bind(&data.phone)
    .bind(now)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ErrorCode::SuperAdminNotFound.into());
    }

    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| ErrorCode::SuperAdminNotFound.into())
}

/// Seed the first super admin. No-op (returns `false`) once one exists.
pub async fn ensure_bootstrap(pool: &PgPool, email: &str, password_hash: &str) -> ServiceResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Serializes concurrent bootstraps from several instances
    sqlx::query("LOCK TABLE super_admins IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM super_admins WHERE status <> 'deleted'")
            .fetch_one(&mut *tx)
            .await?;
    if existing > 0 {
        return Ok(false);
    }

    let user_id = users::create(&mut *tx, email, password_hash, now).await?;
    users::set_claim(&mut *tx, user_id, CLAIM_ROLE, Role::SuperAdmin.as_db()).await?;

    sqlx::query(
        r#"
        INSERT INTO super_admins (id, user_id, name, surname, status, created_at, updated_at)
        VALUES ($1, $2, 'Super', 'Admin', 'active', $3, $3)
        "#,
    )
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}
