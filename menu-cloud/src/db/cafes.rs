//! Café (tenant) database operations

use shared::error::ErrorCode;
use shared::models::{Cafe, CafeCreate, CafeUpdate, EntityStatus, ImageContentType};
use sqlx::{PgConnection, PgPool};

use super::{BoxError, admins, categories, images, items, menus, users};
use crate::error::{ServiceResult, on_unique};

const CAFE_SELECT: &str = r#"
    SELECT c.id, c.name, c.description, c.address, c.phone, c.domain, c.status,
           img.hash AS image, c.created_at, c.updated_at
    FROM cafes c
    LEFT JOIN image_files img
        ON img.content_type = 'cafe' AND img.owner_id = c.id AND img.status = 'active'
"#;

pub async fn list(pool: &PgPool) -> Result<Vec<Cafe>, BoxError> {
    let cafes = sqlx::query_as(&format!(
        "{CAFE_SELECT} WHERE c.status <> 'deleted' ORDER BY c.name, c.id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(cafes)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Cafe>, BoxError> {
    let cafe = sqlx::query_as(&format!(
        "{CAFE_SELECT} WHERE c.id = $1 AND c.status <> 'deleted'"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(cafe)
}

/// Storefront lookup: only active cafés are served
pub async fn find_active_by_domain(pool: &PgPool, domain: &str) -> Result<Option<i64>, BoxError> {
    let id = sqlx::query_scalar("SELECT id FROM cafes WHERE domain = $1 AND status = 'active'")
        .bind(domain)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Current status of a non-deleted café
pub async fn status(pool: &PgPool, id: i64) -> Result<Option<EntityStatus>, BoxError> {
    let status = sqlx::query_scalar("SELECT status FROM cafes WHERE id = $1 AND status <> 'deleted'")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(status)
}

/// Lock a non-deleted café row; `false` when it does not exist.
pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM cafes WHERE id = $1 AND status <> 'deleted' FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

pub async fn create(pool: &PgPool, data: &CafeCreate) -> ServiceResult<Cafe> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        r#"
        INSERT INTO cafes (id, name, description, address, phone, domain, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'active', $7, $7)
        "#,
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(&data.domain)
    .bind(now)
    .execute(pool)
    .await
    .map_err(on_unique(ErrorCode::CafeDomainExists))?;

    Ok(Cafe {
        id,
        name: data.name.clone(),
        description: data.description.clone(),
        address: data.address.clone(),
        phone: data.phone.clone(),
        domain: data.domain.clone(),
        status: EntityStatus::Active,
        image: None,
        created_at: now,
        updated_at: now,
    })
}

/// Partial update. A blank optional text clears the column.
pub async fn update(pool: &PgPool, id: i64, data: &CafeUpdate) -> ServiceResult<Cafe> {
    let now = shared::util::now_millis();

    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE cafes SET
            name        = COALESCE($2, name),
            description = NULLIF(BTRIM(COALESCE($3, description)), ''),
            address     = NULLIF(BTRIM(COALESCE($4, address)), ''),
            phone       = NULLIF(BTRIM(COALESCE($5, phone)), ''),
            domain      = COALESCE($6, domain),
            status      = COALESCE($7, status),
            updated_at  = $8
        WHERE id = $1 AND status <> 'deleted'
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(&data.domain)
    .bind(data.status)
    .bind(now)
    .fetch_optional(pool)
    .await
    .map_err(on_unique(ErrorCode::CafeDomainExists))?;

    if updated.is_none() {
        return Err(ErrorCode::CafeNotFound.into());
    }
    find(pool, id)
        .await?
        .ok_or_else(|| ErrorCode::CafeNotFound.into())
}

/// Soft-delete a café and everything under it in one transaction:
/// menus (links dropped), categories (links dropped), items, admins (users
/// disabled, claims removed) and the images of all of them.
pub async fn delete(pool: &PgPool, id: i64, actor: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let deleted: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE cafes SET status = 'deleted', deleted_by = $2, deleted_at = $3, updated_at = $3
        WHERE id = $1 AND status <> 'deleted'
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(actor)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;
    if deleted.is_none() {
        return Err(ErrorCode::CafeNotFound.into());
    }

    let menu_ids = menus::soft_delete_for_cafe(&mut *tx, id, actor, now).await?;
    let category_ids = categories::soft_delete_for_cafe(&mut *tx, id, actor, now).await?;
    let item_ids = items::soft_delete_for_categories(&mut *tx, &category_ids, actor, now).await?;
    let admin_rows = admins::soft_delete_for_cafe(&mut *tx, id, actor, now).await?;

    let (admin_ids, user_ids): (Vec<i64>, Vec<i64>) = admin_rows.into_iter().unzip();
    users::disable(&mut *tx, &user_ids, now).await?;
    users::remove_claims(&mut *tx, &user_ids).await?;

    images::soft_delete_owners(&mut *tx, ImageContentType::Cafe, &[id], actor, now).await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::Menu, &menu_ids, actor, now).await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::MenuCategory, &category_ids, actor, now)
        .await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::MenuItem, &item_ids, actor, now).await?;
    images::soft_delete_owners(&mut *tx, ImageContentType::Admin, &admin_ids, actor, now).await?;

    tx.commit().await?;

    tracing::info!(
        cafe_id = id,
        menus = menu_ids.len(),
        categories = category_ids.len(),
        items = item_ids.len(),
        admins = admin_ids.len(),
        "Café deleted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, ACTOR, code};
    use crate::db::images::{ImageOwner, set_image};

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_cascades_to_everything_under_the_cafe(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "gone.example").await;
        let neighbour = fixtures::cafe(&pool, "stays.example").await;
        let category = fixtures::category(&pool, cafe.id, "Coffee").await;
        let item = fixtures::item(&pool, cafe.id, category.id, "Flat white").await;
        let menu = fixtures::menu(&pool, cafe.id, "Main", &[category.id]).await.menu.id;
        let admin = fixtures::admin(&pool, cafe.id, "owner@gone.example").await;
        let other_admin = fixtures::admin(&pool, neighbour.id, "owner@stays.example").await;

        set_image(&pool, ImageOwner::Cafe { cafe_id: cafe.id }, &fixtures::image('3'), ACTOR)
            .await
            .unwrap();
        let item_owner = ImageOwner::MenuItem {
            cafe_id: cafe.id,
            item_id: item.id,
        };
        set_image(&pool, item_owner, &fixtures::image('4'), ACTOR)
            .await
            .unwrap();
        set_image(&pool, ImageOwner::Admin { admin_id: admin.id }, &fixtures::image('5'), ACTOR)
            .await
            .unwrap();

        delete(&pool, cafe.id, ACTOR).await.unwrap();

        assert!(find(&pool, cafe.id).await.unwrap().is_none());
        assert!(menus::find(&pool, cafe.id, menu).await.unwrap().is_none());
        assert!(menus::category_ids(&pool, menu).await.unwrap().is_empty());
        assert!(categories::list(&pool, cafe.id).await.unwrap().is_empty());
        assert!(items::list(&pool, cafe.id, None).await.unwrap().is_empty());
        assert!(admins::find(&pool, admin.id).await.unwrap().is_none());

        assert_eq!(users::is_enabled(&pool, admin.user_id).await.unwrap(), None);
        assert!(users::claims(&pool, admin.user_id).await.unwrap().is_empty());
        assert!(admins::session(&pool, admin.user_id).await.unwrap().is_none());

        assert_eq!(fixtures::live_images(&pool, "cafe", cafe.id).await, 0);
        assert_eq!(fixtures::live_images(&pool, "menu_item", item.id).await, 0);
        assert_eq!(fixtures::live_images(&pool, "admin", admin.id).await, 0);

        // The neighbour is untouched
        assert!(find(&pool, neighbour.id).await.unwrap().is_some());
        assert!(admins::find(&pool, other_admin.id).await.unwrap().is_some());
        assert_eq!(
            users::is_enabled(&pool, other_admin.user_id).await.unwrap(),
            Some(true)
        );

        assert_eq!(code(delete(&pool, cafe.id, ACTOR).await), ErrorCode::CafeNotFound);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deleted_cafe_frees_domain_and_emails(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "reuse.example").await;
        fixtures::admin(&pool, cafe.id, "owner@reuse.example").await;

        let data = CafeCreate {
            name: "Copy".to_owned(),
            description: None,
            address: None,
            phone: None,
            domain: "reuse.example".to_owned(),
        };
        assert_eq!(code(create(&pool, &data).await), ErrorCode::CafeDomainExists);

        delete(&pool, cafe.id, ACTOR).await.unwrap();

        let again = create(&pool, &data).await.unwrap();
        fixtures::admin(&pool, again.id, "owner@reuse.example").await;
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_only_active_cafes_resolve_by_domain(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "lookup.example").await;
        assert_eq!(
            find_active_by_domain(&pool, "lookup.example").await.unwrap(),
            Some(cafe.id)
        );

        let data = CafeUpdate {
            status: Some(EntityStatus::Passive),
            ..Default::default()
        };
        update(&pool, cafe.id, &data).await.unwrap();
        assert_eq!(find_active_by_domain(&pool, "lookup.example").await.unwrap(), None);
        assert_eq!(status(&pool, cafe.id).await.unwrap(), Some(EntityStatus::Passive));

        delete(&pool, cafe.id, ACTOR).await.unwrap();
        assert_eq!(status(&pool, cafe.id).await.unwrap(), None);
    }
}
