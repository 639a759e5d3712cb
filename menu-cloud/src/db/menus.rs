//! Menu database operations
//!
//! Links to categories live in `menu_category_links`; the position of a
//! category id in the request list is its `sort_order`. Activation locks
//! the café row so concurrent activations serialize.

use shared::error::ErrorCode;
use shared::models::{ImageContentType, Menu, MenuCreate, MenuDetail, MenuUpdate};
use sqlx::{PgConnection, PgPool};

use super::{BoxError, cafes, images};
use crate::error::ServiceResult;

const MENU_SELECT: &str = r#"
    SELECT m.id, m.cafe_id, m.name, m.description, m.is_active, m.status,
           img.hash AS image, m.created_at, m.updated_at
    FROM menus m
    LEFT JOIN image_files img
        ON img.content_type = 'menu' AND img.owner_id = m.id AND img.status = 'active'
"#;

pub async fn list(pool: &PgPool, cafe_id: i64) -> Result<Vec<Menu>, BoxError> {
    let menus = sqlx::query_as(&format!(
        "{MENU_SELECT} WHERE m.cafe_id = $1 AND m.status <> 'deleted' ORDER BY m.is_active DESC, m.name, m.id"
    ))
    .bind(cafe_id)
    .fetch_all(pool)
    .await?;
    Ok(menus)
}

pub async fn find(pool: &PgPool, cafe_id: i64, id: i64) -> Result<Option<Menu>, BoxError> {
    let menu = sqlx::query_as(&format!(
        "{MENU_SELECT} WHERE m.id = $1 AND m.cafe_id = $2 AND m.status <> 'deleted'"
    ))
    .bind(id)
    .bind(cafe_id)
    .fetch_optional(pool)
    .await?;
    Ok(menu)
}

/// The menu served on the storefront (active flag set, status active)
pub async fn find_active(pool: &PgPool, cafe_id: i64) -> Result<Option<Menu>, BoxError> {
    let menu = sqlx::query_as(&format!(
        "{MENU_SELECT} WHERE m.cafe_id = $1 AND m.is_active AND m.status = 'active'"
    ))
    .bind(cafe_id)
    .fetch_optional(pool)
    .await?;
    Ok(menu)
}

/// Linked category ids in display order
pub async fn category_ids(pool: &PgPool, menu_id: i64) -> Result<Vec<i64>, BoxError> {
    let ids = sqlx::query_scalar(
        r#"
        SELECT l.category_id FROM menu_category_links l
        JOIN menu_categories c ON c.id = l.category_id
        WHERE l.menu_id = $1 AND c.status <> 'deleted'
        ORDER BY l.sort_order, l.category_id
        "#,
    )
    .bind(menu_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn detail(pool: &PgPool, cafe_id: i64, id: i64) -> Result<Option<MenuDetail>, BoxError> {
    let Some(menu) = find(pool, cafe_id, id).await? else {
        return Ok(None);
    };
    let category_ids = category_ids(pool, menu.id).await?;
    Ok(Some(MenuDetail { menu, category_ids }))
}

/// Every id must be a live category of `cafe_id`.
async fn check_categories(
    conn: &mut PgConnection,
    cafe_id: i64,
    category_ids: &[i64],
) -> ServiceResult<()> {
    if category_ids.is_empty() {
        return Ok(());
    }
    let found: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM menu_categories
        WHERE cafe_id = $1 AND id = ANY($2) AND status <> 'deleted'
        "#,
    )
    .bind(cafe_id)
    .bind(category_ids)
    .fetch_one(&mut *conn)
    .await?;
    if found != category_ids.len() as i64 {
        return Err(ErrorCode::CategoryNotInCafe.into());
    }
    Ok(())
}

async fn replace_links(
    conn: &mut PgConnection,
    menu_id: i64,
    category_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM menu_category_links WHERE menu_id = $1")
        .bind(menu_id)
        .execute(&mut *conn)
        .await?;

    if !category_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO menu_category_links (menu_id, category_id, sort_order)
            SELECT $1, t.category_id, (t.ord - 1)::INT
            FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS t(category_id, ord)
            "#,
        )
        .bind(menu_id)
        .bind(category_ids)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn deactivate_others(
    conn: &mut PgConnection,
    cafe_id: i64,
    keep: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE menus SET is_active = FALSE, updated_at = $3
        WHERE cafe_id = $1 AND id <> $2 AND is_active
        "#,
    )
    .bind(cafe_id)
    .bind(keep)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Create a menu with its category links; optionally make it the active one.
pub async fn create(pool: &PgPool, cafe_id: i64, data: &MenuCreate) -> ServiceResult<MenuDetail> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if !cafes::lock(&mut *tx, cafe_id).await? {
        return Err(ErrorCode::CafeNotFound.into());
    }
    check_categories(&mut *tx, cafe_id, &data.category_ids).await?;
    if data.is_active {
        deactivate_others(&mut *tx, cafe_id, id, now).await?;
    }

    sqlx::query(
        r#"
        INSERT INTO menus (id, cafe_id, name, description, is_active, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 'active', $6, $6)
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.is_active)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    replace_links(&mut *tx, id, &data.category_ids).await?;
    tx.commit().await?;

    tracing::info!(cafe_id, menu_id = id, active = data.is_active, "Menu created");

    detail(pool, cafe_id, id)
        .await?
        .ok_or_else(|| ErrorCode::MenuNotFound.into())
}

/// Update menu fields; `category_ids: Some(..)` replaces the link set.
pub async fn update(
    pool: &PgPool,
    cafe_id: i64,
    id: i64,
    data: &MenuUpdate,
) -> ServiceResult<MenuDetail> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE menus SET
            name        = COALESCE($3, name),
            description = NULLIF(BTRIM(COALESCE($4, description)), ''),
            status      = COALESCE($5, status),
            updated_at  = $6
        WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted'
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.status)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    if updated.is_none() {
        return Err(ErrorCode::MenuNotFound.into());
    }

    if let Some(category_ids) = &data.category_ids {
        check_categories(&mut *tx, cafe_id, category_ids).await?;
        replace_links(&mut *tx, id, category_ids).await?;
    }
    tx.commit().await?;

    detail(pool, cafe_id, id)
        .await?
        .ok_or_else(|| ErrorCode::MenuNotFound.into())
}

/// Soft-delete a menu and its image; its links are dropped.
pub async fn delete(pool: &PgPool, cafe_id: i64, id: i64, actor: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let deleted: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE menus SET status = 'deleted', is_active = FALSE,
            deleted_by = $3, deleted_at = $4, updated_at = $4
        WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted'
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(actor)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    if deleted.is_none() {
        return Err(ErrorCode::MenuNotFound.into());
    }

    replace_links(&mut *tx, id, &[]).await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::Menu, &[id], actor, now).await?;

    tx.commit().await?;
    tracing::info!(cafe_id, menu_id = id, "Menu deleted");
    Ok(())
}

/// Make `id` the café's only active menu.
pub async fn activate(pool: &PgPool, cafe_id: i64, id: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if !cafes::lock(&mut *tx, cafe_id).await? {
        return Err(ErrorCode::CafeNotFound.into());
    }
    let exists: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM menus WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted'",
    )
    .bind(id)
    .bind(cafe_id)
    .fetch_optional(&mut *tx)
    .await?;
    if exists.is_none() {
        return Err(ErrorCode::MenuNotFound.into());
    }

    deactivate_others(&mut *tx, cafe_id, id, now).await?;
    sqlx::query("UPDATE menus SET is_active = TRUE, updated_at = $2 WHERE id = $1")
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(cafe_id, menu_id = id, "Menu activated");
    Ok(())
}

pub async fn deactivate(pool: &PgPool, cafe_id: i64, id: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        r#"
        UPDATE menus SET is_active = FALSE, updated_at = $3
        WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted'
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(now)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ErrorCode::MenuNotFound.into());
    }
    Ok(())
}

/// Soft-delete every menu of a café (links dropped). Returns their ids.
pub async fn soft_delete_for_cafe(
    conn: &mut PgConnection,
    cafe_id: i64,
    actor: i64,
    now: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    let ids: Vec<i64> = sqlx::query_scalar(
        r#"
        UPDATE menus SET status = 'deleted', is_active = FALSE,
            deleted_by = $2, deleted_at = $3, updated_at = $3
        WHERE cafe_id = $1 AND status <> 'deleted'
        RETURNING id
        "#,
    )
    .bind(cafe_id)
    .bind(actor)
    .bind(now)
    .fetch_all(&mut *conn)
    .await?;

    if !ids.is_empty() {
        sqlx::query("DELETE FROM menu_category_links WHERE menu_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *conn)
            .await?;
    }
    Ok(ids)
}
