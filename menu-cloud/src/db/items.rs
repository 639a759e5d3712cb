//! Menu item database operations
//!
//! Items carry no café id; scope is checked through their category.

use shared::error::ErrorCode;
use shared::models::{ImageContentType, MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::{PgConnection, PgPool};

use super::{BoxError, categories, images};
use crate::error::ServiceResult;

const ITEM_SELECT: &str = r#"
    SELECT i.id, i.category_id, i.name, i.description, i.price, i.sort_order,
           i.is_available, i.status, img.hash AS image, i.created_at, i.updated_at
    FROM menu_items i
    JOIN menu_categories c ON c.id = i.category_id
    LEFT JOIN image_files img
        ON img.content_type = 'menu_item' AND img.owner_id = i.id AND img.status = 'active'
"#;

/// Items of a café, optionally narrowed to one category
pub async fn list(
    pool: &PgPool,
    cafe_id: i64,
    category_id: Option<i64>,
) -> Result<Vec<MenuItem>, BoxError> {
    let items = sqlx::query_as(&format!(
        r#"{ITEM_SELECT}
        WHERE c.cafe_id = $1 AND c.status <> 'deleted' AND i.status <> 'deleted'
          AND ($2::BIGINT IS NULL OR i.category_id = $2)
        ORDER BY c.sort_order, c.id, i.sort_order, i.name, i.id"#
    ))
    .bind(cafe_id)
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find(pool: &PgPool, cafe_id: i64, id: i64) -> Result<Option<MenuItem>, BoxError> {
    let item = sqlx::query_as(&format!(
        r#"{ITEM_SELECT}
        WHERE i.id = $1 AND c.cafe_id = $2 AND c.status <> 'deleted' AND i.status <> 'deleted'"#
    ))
    .bind(id)
    .bind(cafe_id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

/// Live items of the given categories (storefront assembly)
pub async fn list_for_categories(
    pool: &PgPool,
    category_ids: &[i64],
) -> Result<Vec<MenuItem>, BoxError> {
    if category_ids.is_empty() {
        return Ok(vec![]);
    }
    let items = sqlx::query_as(&format!(
        r#"{ITEM_SELECT}
        WHERE i.category_id = ANY($1) AND i.status <> 'deleted'
        ORDER BY i.sort_order, i.id"#
    ))
    .bind(category_ids)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn create(pool: &PgPool, cafe_id: i64, data: &MenuItemCreate) -> ServiceResult<MenuItem> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if !categories::exists_in_cafe(&mut *tx, cafe_id, data.category_id).await? {
        return Err(ErrorCode::CategoryNotInCafe.into());
    }

    sqlx::query(
        r#"
        INSERT INTO menu_items (
            id, category_id, name, description, price, sort_order,
            is_available, status, created_at, updated_at
        )
        VALUES (
            $1, $2, $3, $4, $5,
            COALESCE($6, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM menu_items
                          WHERE category_id = $2 AND status <> 'deleted')),
            $7, 'active', $8, $8
        )
        "#,
    )
    .bind(id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.sort_order)
    .bind(data.is_available.unwrap_or(true))
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find(pool, cafe_id, id)
        .await?
        .ok_or_else(|| ErrorCode::ItemNotFound.into())
}

/// Update an item; a new `category_id` must belong to the same café.
pub async fn update(
    pool: &PgPool,
    cafe_id: i64,
    id: i64,
    data: &MenuItemUpdate,
) -> ServiceResult<MenuItem> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if let Some(category_id) = data.category_id
        && !categories::exists_in_cafe(&mut *tx, cafe_id, category_id).await?
    {
        return Err(ErrorCode::CategoryNotInCafe.into());
    }

    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE menu_items i SET
            category_id  = COALESCE($3, i.category_id),
            name         = COALESCE($4, i.name),
            description  = NULLIF(BTRIM(COALESCE($5, i.description)), ''),
            price        = COALESCE($6, i.price),
            sort_order   = COALESCE($7, i.sort_order),
            is_available = COALESCE($8, i.is_available),
            status       = COALESCE($9, i.status),
            updated_at   = $10
        FROM menu_categories c
        WHERE i.id = $1 AND c.id = i.category_id AND c.cafe_id = $2
          AND i.status <> 'deleted' AND c.status <> 'deleted'
        RETURNING i.id
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.sort_order)
    .bind(data.is_available)
    .bind(data.status)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    if updated.is_none() {
        return Err(ErrorCode::ItemNotFound.into());
    }

    tx.commit().await?;

    find(pool, cafe_id, id)
        .await?
        .ok_or_else(|| ErrorCode::ItemNotFound.into())
}

/// Soft-delete an item and its image.
pub async fn delete(pool: &PgPool, cafe_id: i64, id: i64, actor: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let deleted: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE menu_items i SET status = 'deleted', deleted_by = $3, deleted_at = $4, updated_at = $4
        FROM menu_categories c
        WHERE i.id = $1 AND c.id = i.category_id AND c.cafe_id = $2
          AND i.status <> 'deleted' AND c.status <> 'deleted'
        RETURNING i.id
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(actor)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    if deleted.is_none() {
        return Err(ErrorCode::ItemNotFound.into());
    }

    images::soft_delete_owners(&mut *tx, ImageContentType::MenuItem, &[id], actor, now).await?;

    tx.commit().await?;
    tracing::info!(cafe_id, item_id = id, "Menu item deleted");
    Ok(())
}

/// Soft-delete every live item of the given categories. Returns their ids.
pub async fn soft_delete_for_categories(
    conn: &mut PgConnection,
    category_ids: &[i64],
    actor: i64,
    now: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    if category_ids.is_empty() {
        return Ok(vec![]);
    }
    let ids = sqlx::query_scalar(
        r#"
        UPDATE menu_items SET status = 'deleted', deleted_by = $2, deleted_at = $3, updated_at = $3
        WHERE category_id = ANY($1) AND status <> 'deleted'
        RETURNING id
        "#,
    )
    .bind(category_ids)
    .bind(actor)
    .bind(now)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, code};

    #[sqlx::test(migrations = "./migrations")]
    async fn test_item_needs_category_of_same_cafe(pool: PgPool) {
        let mine = fixtures::cafe(&pool, "mine.example").await;
        let theirs = fixtures::cafe(&pool, "theirs.example").await;
        let own = fixtures::category(&pool, mine.id, "Coffee").await;
        let foreign = fixtures::category(&pool, theirs.id, "Tea").await;

        let data = MenuItemCreate {
            category_id: foreign.id,
            name: "Sencha".to_owned(),
            description: None,
            price: "2.00".parse().unwrap(),
            sort_order: None,
            is_available: None,
        };
        assert_eq!(
            code(create(&pool, mine.id, &data).await),
            ErrorCode::CategoryNotInCafe
        );

        let item = fixtures::item(&pool, mine.id, own.id, "Latte").await;
        let data = MenuItemUpdate {
            category_id: Some(foreign.id),
            ..Default::default()
        };
        assert_eq!(
            code(update(&pool, mine.id, item.id, &data).await),
            ErrorCode::CategoryNotInCafe
        );
        let item = find(&pool, mine.id, item.id).await.unwrap().unwrap();
        assert_eq!(item.category_id, own.id);
        assert!(find(&pool, theirs.id, item.id).await.unwrap().is_none());
    }
}
