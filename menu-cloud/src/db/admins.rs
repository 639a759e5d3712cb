//! Café admin accounts
//!
//! Every write that touches an admin's café also rewrites the user's
//! `cafe_id` claim inside the same transaction, so the column and the
//! claim never disagree.

use shared::error::ErrorCode;
use shared::models::{
    Admin, AdminCreate, AdminUpdate, CLAIM_CAFE_ID, CLAIM_ROLE, EntityStatus, ImageContentType,
    ProfileUpdate, Role,
};
use sqlx::{PgConnection, PgPool};

use super::{BoxError, cafes, images, users};
use crate::error::ServiceResult;

const ADMIN_SELECT: &str = r#"
    SELECT a.id, a.user_id, a.cafe_id, u.email, a.name, a.surname, a.phone, a.status,
           img.hash AS image, a.created_at, a.updated_at
    FROM admins a
    JOIN users u ON u.id = a.user_id
    LEFT JOIN image_files img
        ON img.content_type = 'admin' AND img.owner_id = a.id AND img.status = 'active'
"#;

pub async fn list(pool: &PgPool, cafe_id: Option<i64>) -> Result<Vec<Admin>, BoxError> {
    let admins = sqlx::query_as(&format!(
        r#"{ADMIN_SELECT}
        WHERE a.status <> 'deleted' AND ($1::BIGINT IS NULL OR a.cafe_id = $1)
        ORDER BY a.name, a.surname, a.id"#
    ))
    .bind(cafe_id)
    .fetch_all(pool)
    .await?;
    Ok(admins)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Admin>, BoxError> {
    let admin = sqlx::query_as(&format!(
        "{ADMIN_SELECT} WHERE a.id = $1 AND a.status <> 'deleted'"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(admin)
}

pub async fn find_by_user(pool: &PgPool, user_id: i64) -> Result<Option<Admin>, BoxError> {
    let admin = sqlx::query_as(&format!(
        "{ADMIN_SELECT} WHERE a.user_id = $1 AND a.status <> 'deleted'"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(admin)
}

/// Current state behind an admin token, re-read on every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct AdminSession {
    pub is_enabled: bool,
    /// `admins.cafe_id`; kept equal to the `cafe_id` claim by every write
    pub cafe_id: i64,
    pub admin_status: EntityStatus,
    pub cafe_status: EntityStatus,
}

/// `None` when the user has no live admin row
pub async fn session(pool: &PgPool, user_id: i64) -> Result<Option<AdminSession>, BoxError> {
    let session = sqlx::query_as(
        r#"
        SELECT u.is_enabled, a.cafe_id, a.status AS admin_status, c.status AS cafe_status
        FROM users u
        JOIN admins a ON a.user_id = u.id AND a.status <> 'deleted'
        JOIN cafes c ON c.id = a.cafe_id
        WHERE u.id = $1 AND u.deleted_at IS NULL
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// User + admin row + `role` and `cafe_id` claims, one transaction.
pub async fn create(pool: &PgPool, data: &AdminCreate, password_hash: &str) -> ServiceResult<Admin> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if !cafes::lock(&mut *tx, data.cafe_id).await? {
        return Err(ErrorCode::CafeNotFound.into());
    }

    let user_id = users::create(&mut *tx, &data.email, password_hash, now).await?;
    users::set_claim(&mut *tx, user_id, CLAIM_ROLE, Role::Admin.as_db()).await?;
    users::set_claim(&mut *tx, user_id, CLAIM_CAFE_ID, &data.cafe_id.to_string()).await?;

    sqlx::query(
        r#"
        INSERT INTO admins (id, user_id, cafe_id, name, surname, phone, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'active', $7, $7)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(data.cafe_id)
    .bind(&data.name)
    .bind(&data.surname)
    .bind(&data.phone)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(admin_id = id, cafe_id = data.cafe_id, "Admin created");

    Ok(Admin {
        id,
        user_id,
        cafe_id: data.cafe_id,
        email: data.email.clone(),
        name: data.name.clone(),
        surname: data.surname.clone(),
        phone: data.phone.clone(),
        status: EntityStatus::Active,
        image: None,
        created_at: now,
        updated_at: now,
    })
}

/// Update an admin. A café change re-syncs the `cafe_id` claim and an
/// email change updates the login user, both in the same transaction.
pub async fn update(pool: &PgPool, id: i64, data: &AdminUpdate) -> ServiceResult<Admin> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let current: Option<(i64, i64)> = sqlx::query_as(
        "SELECT user_id, cafe_id FROM admins WHERE id = $1 AND status <> 'deleted' FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((user_id, current_cafe)) = current else {
        return Err(ErrorCode::AdminNotFound.into());
    };

    if let Some(cafe_id) = data.cafe_id
        && cafe_id != current_cafe
    {
        if !cafes::lock(&mut *tx, cafe_id).await? {
            return Err(ErrorCode::CafeNotFound.into());
        }
        users::set_claim(&mut *tx, user_id, CLAIM_CAFE_ID, &cafe_id.to_string()).await?;
        tracing::info!(admin_id = id, from = current_cafe, to = cafe_id, "Admin moved to café");
    }

    if let Some(email) = &data.email {
        users::update_email(&mut *tx, user_id, email, now).await?;
    }

    sqlx::query(
        r#"
        UPDATE admins SET
            cafe_id    = COALESCE($2, cafe_id),
            name       = COALESCE($3, name),
            surname    = COALESCE($4, surname),
            phone      = NULLIF(BTRIM(COALESCE($5, phone)), ''),
            status     = COALESCE($6, status),
            updated_at = $7
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(data.cafe_id)
    .bind(&data.name)
    .bind(&data.surname)
    .bind(&data.phone)
    .bind(data.status)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find(pool, id)
        .await?
        .ok_or_else(|| ErrorCode::AdminNotFound.into())
}

/// Own profile (name, surname, phone) of the admin linked to `user_id`
pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    data: &ProfileUpdate,
) -> ServiceResult<Admin> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        r#"
        UPDATE admins SET
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
        return Err(ErrorCode::AdminNotFound.into());
    }

    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| ErrorCode::AdminNotFound.into())
}

/// Soft-delete an admin: disable the user, drop its claims, soft-delete its
/// image. One transaction.
pub async fn delete(pool: &PgPool, id: i64, actor: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let user_id: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE admins SET status = 'deleted', deleted_by = $2, deleted_at = $3, updated_at = $3
        WHERE id = $1 AND status <> 'deleted'
        RETURNING user_id
        "#,
    )
    .bind(id)
    .bind(actor)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(user_id) = user_id else {
        return Err(ErrorCode::AdminNotFound.into());
    };

    users::disable(&mut *tx, &[user_id], now).await?;
    users::remove_claims(&mut *tx, &[user_id]).await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::Admin, &[id], actor, now).await?;

    tx.commit().await?;
    tracing::info!(admin_id = id, "Admin deleted");
    Ok(())
}

/// Soft-delete every admin of a café. Returns `(admin_id, user_id)` pairs.
pub async fn soft_delete_for_cafe(
    conn: &mut PgConnection,
    cafe_id: i64,
    actor: i64,
    now: i64,
) -> Result<Vec<(i64, i64)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE admins SET status = 'deleted', deleted_by = $2, deleted_at = $3, updated_at = $3
        WHERE cafe_id = $1 AND status <> 'deleted'
        RETURNING id, user_id
        "#,
    )
    .bind(cafe_id)
    .bind(actor)
    .bind(now)
    .fetch_all(&mut *conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, ACTOR, code};

    async fn cafe_claim(pool: &PgPool, user_id: i64) -> Option<String> {
        users::claims(pool, user_id)
            .await
            .unwrap()
            .into_iter()
            .find(|(kind, _)| kind == CLAIM_CAFE_ID)
            .map(|(_, value)| value)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_move_resyncs_cafe_claim(pool: PgPool) {
        let from = fixtures::cafe(&pool, "from.example").await;
        let to = fixtures::cafe(&pool, "to.example").await;
        let admin = fixtures::admin(&pool, from.id, "mover@example.com").await;
        assert_eq!(cafe_claim(&pool, admin.user_id).await, Some(from.id.to_string()));

        let data = AdminUpdate {
            cafe_id: Some(to.id),
            name: Some("Grace".to_owned()),
            ..Default::default()
        };
        let moved = update(&pool, admin.id, &data).await.unwrap();

        assert_eq!(moved.cafe_id, to.id);
        assert_eq!(moved.name, "Grace");
        assert_eq!(cafe_claim(&pool, admin.user_id).await, Some(to.id.to_string()));
        let session = session(&pool, admin.user_id).await.unwrap().unwrap();
        assert_eq!(session.cafe_id, to.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_move_to_missing_cafe_changes_nothing(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "home.example").await;
        let admin = fixtures::admin(&pool, cafe.id, "stay@example.com").await;

        let data = AdminUpdate {
            cafe_id: Some(cafe.id + 1),
            ..Default::default()
        };
        assert_eq!(code(update(&pool, admin.id, &data).await), ErrorCode::CafeNotFound);
        assert_eq!(cafe_claim(&pool, admin.user_id).await, Some(cafe.id.to_string()));
        assert_eq!(find(&pool, admin.id).await.unwrap().unwrap().cafe_id, cafe.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_session_follows_statuses(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "status.example").await;
        let admin = fixtures::admin(&pool, cafe.id, "status@example.com").await;

        let current = session(&pool, admin.user_id).await.unwrap().unwrap();
        assert!(current.is_enabled);
        assert_eq!(current.admin_status, EntityStatus::Active);
        assert_eq!(current.cafe_status, EntityStatus::Active);

        let data = AdminUpdate {
            status: Some(EntityStatus::Passive),
            ..Default::default()
        };
        update(&pool, admin.id, &data).await.unwrap();
        let data = shared::models::CafeUpdate {
            status: Some(EntityStatus::Passive),
            ..Default::default()
        };
        cafes::update(&pool, cafe.id, &data).await.unwrap();

        let current = session(&pool, admin.user_id).await.unwrap().unwrap();
        assert_eq!(current.admin_status, EntityStatus::Passive);
        assert_eq!(current.cafe_status, EntityStatus::Passive);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_retires_login(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "retire.example").await;
        let admin = fixtures::admin(&pool, cafe.id, "retire@example.com").await;

        delete(&pool, admin.id, ACTOR).await.unwrap();

        assert!(find(&pool, admin.id).await.unwrap().is_none());
        assert!(session(&pool, admin.user_id).await.unwrap().is_none());
        assert!(users::claims(&pool, admin.user_id).await.unwrap().is_empty());
        assert!(
            users::find_by_email(&pool, "retire@example.com")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(code(delete(&pool, admin.id, ACTOR).await), ErrorCode::AdminNotFound);

        // The email is free again
        fixtures::admin(&pool, cafe.id, "retire@example.com").await;
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_live_email_rejected(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "dup.example").await;
        fixtures::admin(&pool, cafe.id, "dup@example.com").await;

        let data = AdminCreate {
            cafe_id: cafe.id,
            email: "dup@example.com".to_owned(),
            password: "irrelevant".to_owned(),
            name: "Second".to_owned(),
            surname: "Admin".to_owned(),
            phone: None,
        };
        assert_eq!(
            code(create(&pool, &data, "$argon2id$fixture").await),
            ErrorCode::EmailExists
        );
    }
}
