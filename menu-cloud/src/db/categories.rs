//! Menu category database operations

use shared::error::ErrorCode;
use shared::models::{ImageContentType, MenuCategory, MenuCategoryCreate, MenuCategoryUpdate};
use sqlx::{PgConnection, PgPool};

use super::{BoxError, images, items};
use crate::error::ServiceResult;

const CATEGORY_SELECT: &str = r#"
    SELECT c.id, c.cafe_id, c.name, c.description, c.sort_order, c.status,
           img.hash AS image, c.created_at, c.updated_at
    FROM menu_categories c
    LEFT JOIN image_files img
        ON img.content_type = 'menu_category' AND img.owner_id = c.id AND img.status = 'active'
"#;

pub async fn list(pool: &PgPool, cafe_id: i64) -> Result<Vec<MenuCategory>, BoxError> {
    let categories = sqlx::query_as(&format!(
        "{CATEGORY_SELECT} WHERE c.cafe_id = $1 AND c.status <> 'deleted' ORDER BY c.sort_order, c.name, c.id"
    ))
    .bind(cafe_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn find(pool: &PgPool, cafe_id: i64, id: i64) -> Result<Option<MenuCategory>, BoxError> {
    let category = sqlx::query_as(&format!(
        "{CATEGORY_SELECT} WHERE c.id = $1 AND c.cafe_id = $2 AND c.status <> 'deleted'"
    ))
    .bind(id)
    .bind(cafe_id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

/// Categories linked to a menu, in the menu's display order
pub async fn list_for_menu(pool: &PgPool, menu_id: i64) -> Result<Vec<MenuCategory>, BoxError> {
    let categories = sqlx::query_as(&format!(
        r#"{CATEGORY_SELECT}
        JOIN menu_category_links l ON l.category_id = c.id
        WHERE l.menu_id = $1 AND c.status <> 'deleted'
        ORDER BY l.sort_order, c.id"#
    ))
    .bind(menu_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// Whether `id` is a live category of `cafe_id`
pub async fn exists_in_cafe(
    conn: &mut PgConnection,
    cafe_id: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM menu_categories WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted'",
    )
    .bind(id)
    .bind(cafe_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found.is_some())
}

/// Create a category; without an explicit `sort_order` it goes last.
pub async fn create(
    pool: &PgPool,
    cafe_id: i64,
    data: &MenuCategoryCreate,
) -> Result<MenuCategory, BoxError> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let category = sqlx::query_as(
        r#"
        INSERT INTO menu_categories (id, cafe_id, name, description, sort_order, status, created_at, updated_at)
        VALUES (
            $1, $2, $3, $4,
            COALESCE($5, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM menu_categories
                          WHERE cafe_id = $2 AND status <> 'deleted')),
            'active', $6, $6
        )
        RETURNING id, cafe_id, name, description, sort_order, status,
                  NULL::TEXT AS image, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.sort_order)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(category)
}

pub async fn update(
    pool: &PgPool,
    cafe_id: i64,
    id: i64,
    data: &MenuCategoryUpdate,
) -> ServiceResult<MenuCategory> {
    let now = shared::util::now_millis();

    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE menu_categories SET
            name        = COALESCE($3, name),
            description = NULLIF(BTRIM(COALESCE($4, description)), ''),
            sort_order  = COALESCE($5, sort_order),
            status      = COALESCE($6, status),
            updated_at  = $7
        WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted'
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(cafe_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.sort_order)
    .bind(data.status)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    if updated.is_none() {
        return Err(ErrorCode::CategoryNotFound.into());
    }

    find(pool, cafe_id, id)
        .await?
        .ok_or_else(|| ErrorCode::CategoryNotFound.into())
}

/// Soft-delete a category, its items and all their images; drop its menu
/// links. One transaction.
pub async fn delete(pool: &PgPool, cafe_id: i64, id: i64, actor: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let deleted: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE menu_categories SET status = 'deleted', deleted_by = $3, deleted_at = $4, updated_at = $4
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
        return Err(ErrorCode::CategoryNotFound.into());
    }

    sqlx::query("DELETE FROM menu_category_links WHERE category_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let item_ids = items::soft_delete_for_categories(&mut *tx, &[id], actor, now).await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::MenuCategory, &[id], actor, now).await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::MenuItem, &item_ids, actor, now).await?;

    tx.commit().await?;
    tracing::info!(cafe_id, category_id = id, items = item_ids.len(), "Category deleted");
    Ok(())
}

/// Soft-delete every category of a café (links dropped). Returns their ids.
pub async fn soft_delete_for_cafe(
    conn: &mut PgConnection,
    cafe_id: i64,
    actor: i64,
    now: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    let ids: Vec<i64> = sqlx::query_scalar(
        r#"
        UPDATE menu_categories SET status = 'deleted', deleted_by = $2, deleted_at = $3, updated_at = $3
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
        sqlx::query("DELETE FROM menu_category_links WHERE category_id = ANY($1)")
            .bind(&ids)
            .execute(&mut *conn)
            .await?;
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, ACTOR, code};
    use crate::db::images::{ImageOwner, set_image};
    use crate::db::menus;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_cascades_to_items_links_and_images(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "cascade.example").await;
        let doomed = fixtures::category(&pool, cafe.id, "Pastry").await;
        let kept = fixtures::category(&pool, cafe.id, "Coffee").await;
        let croissant = fixtures::item(&pool, cafe.id, doomed.id, "Croissant").await;
        let espresso = fixtures::item(&pool, cafe.id, kept.id, "Espresso").await;
        let menu = fixtures::menu(&pool, cafe.id, "Breakfast", &[doomed.id, kept.id])
            .await
            .menu
            .id;

        let category_owner = ImageOwner::MenuCategory {
            cafe_id: cafe.id,
            category_id: doomed.id,
        };
        let item_owner = ImageOwner::MenuItem {
            cafe_id: cafe.id,
            item_id: croissant.id,
        };
        set_image(&pool, category_owner, &fixtures::image('1'), ACTOR)
            .await
            .unwrap();
        set_image(&pool, item_owner, &fixtures::image('2'), ACTOR)
            .await
            .unwrap();

        delete(&pool, cafe.id, doomed.id, ACTOR).await.unwrap();

        assert!(find(&pool, cafe.id, doomed.id).await.unwrap().is_none());
        assert!(items::find(&pool, cafe.id, croissant.id).await.unwrap().is_none());
        assert!(items::find(&pool, cafe.id, espresso.id).await.unwrap().is_some());
        assert_eq!(menus::category_ids(&pool, menu).await.unwrap(), vec![kept.id]);
        assert_eq!(fixtures::live_images(&pool, "menu_category", doomed.id).await, 0);
        assert_eq!(fixtures::live_images(&pool, "menu_item", croissant.id).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_other_cafe_category_is_invisible(pool: PgPool) {
        let mine = fixtures::cafe(&pool, "mine.example").await;
        let theirs = fixtures::cafe(&pool, "theirs.example").await;
        let category = fixtures::category(&pool, theirs.id, "Tea").await;

        assert!(find(&pool, mine.id, category.id).await.unwrap().is_none());
        assert_eq!(
            code(delete(&pool, mine.id, category.id, ACTOR).await),
            ErrorCode::CategoryNotFound
        );
        let data = MenuCategoryUpdate {
            name: Some("Stolen".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            code(update(&pool, mine.id, category.id, &data).await),
            ErrorCode::CategoryNotFound
        );
        assert_eq!(find(&pool, theirs.id, category.id).await.unwrap().unwrap().name, "Tea");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_new_category_goes_last(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "sort.example").await;
        let first = fixtures::category(&pool, cafe.id, "First").await;
        let second = fixtures::category(&pool, cafe.id, "Second").await;
        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_blank_description_clears(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "blank.example").await;
        let category = fixtures::category(&pool, cafe.id, "Cakes").await;

        let data = MenuCategoryUpdate {
            description: Some("Baked daily".to_owned()),
            ..Default::default()
        };
        let updated = update(&pool, cafe.id, category.id, &data).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("Baked daily"));

        let data = MenuCategoryUpdate {
            description: Some(String::new()),
            ..Default::default()
        };
        let updated = update(&pool, cafe.id, category.id, &data).await.unwrap();
        assert_eq!(updated.description, None);
    }
}
