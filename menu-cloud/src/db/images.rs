//! Image rows (`image_files`) and their owners
//!
//! An owner has at most one live row. Replacing soft-deletes the current
//! row and inserts the new one in the same transaction; the owner row is
//! locked first so concurrent uploads for one owner serialize instead of
//! tripping the partial unique index. Files on disk are never touched here,
//! see `media::ImageStore::sweep_orphans`.

use std::collections::HashSet;

use shared::error::ErrorCode;
use shared::models::ImageContentType;
use sqlx::{PgConnection, PgPool};

use super::BoxError;
use crate::error::ServiceResult;
use crate::media::ProcessedImage;

/// An image owner plus the café scope it must be found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOwner {
    Admin { admin_id: i64 },
    SuperAdmin { super_admin_id: i64 },
    Cafe { cafe_id: i64 },
    Menu { cafe_id: i64, menu_id: i64 },
    MenuCategory { cafe_id: i64, category_id: i64 },
    MenuItem { cafe_id: i64, item_id: i64 },
}

impl ImageOwner {
    pub fn content_type(&self) -> ImageContentType {
        match self {
            Self::Admin { .. } => ImageContentType::Admin,
            Self::SuperAdmin { .. } => ImageContentType::SuperAdmin,
            Self::Cafe { .. } => ImageContentType::Cafe,
            Self::Menu { .. } => ImageContentType::Menu,
            Self::MenuCategory { .. } => ImageContentType::MenuCategory,
            Self::MenuItem { .. } => ImageContentType::MenuItem,
        }
    }

    pub fn owner_id(&self) -> i64 {
        match *self {
            Self::Admin { admin_id } => admin_id,
            Self::SuperAdmin { super_admin_id } => super_admin_id,
            Self::Cafe { cafe_id } => cafe_id,
            Self::Menu { menu_id, .. } => menu_id,
            Self::MenuCategory { category_id, .. } => category_id,
            Self::MenuItem { item_id, .. } => item_id,
        }
    }

    /// Error reported when the owner does not exist in scope
    pub fn not_found(&self) -> ErrorCode {
        match self {
            Self::Admin { .. } => ErrorCode::AdminNotFound,
            Self::SuperAdmin { .. } => ErrorCode::SuperAdminNotFound,
            Self::Cafe { .. } => ErrorCode::CafeNotFound,
            Self::Menu { .. } => ErrorCode::MenuNotFound,
            Self::MenuCategory { .. } => ErrorCode::CategoryNotFound,
            Self::MenuItem { .. } => ErrorCode::ItemNotFound,
        }
    }

    /// Lock the owner row; `false` when it does not exist in scope.
    async fn lock(&self, conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
        let query = match *self {
            Self::Admin { admin_id } => sqlx::query_scalar::<_, i64>(
                "SELECT id FROM admins WHERE id = $1 AND status <> 'deleted' FOR UPDATE",
            )
            .bind(admin_id),
            Self::SuperAdmin { super_admin_id } => sqlx::query_scalar(
                "SELECT id FROM super_admins WHERE id = $1 AND status <> 'deleted' FOR UPDATE",
            )
            .bind(super_admin_id),
            Self::Cafe { cafe_id } => sqlx::query_scalar(
                "SELECT id FROM cafes WHERE id = $1 AND status <> 'deleted' FOR UPDATE",
            )
            .bind(cafe_id),
            Self::Menu { cafe_id, menu_id } => sqlx::query_scalar(
                "SELECT id FROM menus WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted' FOR UPDATE",
            )
            .bind(menu_id)
            .bind(cafe_id),
            Self::MenuCategory {
                cafe_id,
                category_id,
            } => sqlx::query_scalar(
                "SELECT id FROM menu_categories WHERE id = $1 AND cafe_id = $2 AND status <> 'deleted' FOR UPDATE",
            )
            .bind(category_id)
            .bind(cafe_id),
            Self::MenuItem { cafe_id, item_id } => sqlx::query_scalar(
                r#"
                SELECT i.id FROM menu_items i
                JOIN menu_categories c ON c.id = i.category_id
                WHERE i.id = $1 AND c.cafe_id = $2
                  AND i.status <> 'deleted' AND c.status <> 'deleted'
                FOR UPDATE OF i
                "#,
            )
            .bind(item_id)
            .bind(cafe_id),
        };
        Ok(query.fetch_optional(&mut *conn).await?.is_some())
    }
}

/// Soft-delete the owner's live image (if any) and insert `image` as the new one.
pub async fn replace(
    conn: &mut PgConnection,
    content_type: ImageContentType,
    owner_id: i64,
    image: &ProcessedImage,
    actor: i64,
    now: i64,
) -> Result<i64, sqlx::Error> {
    soft_delete_owners(conn, content_type, &[owner_id], actor, now).await?;

    let id = shared::util::snowflake_id();
    sqlx::query(
        r#"
        INSERT INTO image_files (
            id, content_type, owner_id, file_name, hash, byte_size,
            status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'active', $7, $7)
        "#,
    )
    .bind(id)
    .bind(content_type)
    .bind(owner_id)
    .bind(&image.file_name)
    .bind(&image.hash)
    .bind(image.bytes.len() as i64)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

/// Soft-delete the live images of `owner_ids`. Returns the number of rows hit.
pub async fn soft_delete_owners(
    conn: &mut PgConnection,
    content_type: ImageContentType,
    owner_ids: &[i64],
    actor: i64,
    now: i64,
) -> Result<u64, sqlx::Error> {
    if owner_ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query(
        r#"
        UPDATE image_files
        SET status = 'deleted', deleted_by = $3, deleted_at = $4, updated_at = $4
        WHERE content_type = $1 AND owner_id = ANY($2) AND status <> 'deleted'
        "#,
    )
    .bind(content_type)
    .bind(owner_ids)
    .bind(actor)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Attach `image` to `owner` (the file must already be stored).
pub async fn set_image(
    pool: &PgPool,
    owner: ImageOwner,
    image: &ProcessedImage,
    actor: i64,
) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if !owner.lock(&mut *tx).await? {
        return Err(owner.not_found().into());
    }
    replace(&mut *tx, owner.content_type(), owner.owner_id(), image, actor, now).await?;

    tx.commit().await?;
    Ok(())
}

/// Detach the current image of `owner`.
pub async fn clear_image(pool: &PgPool, owner: ImageOwner, actor: i64) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if !owner.lock(&mut *tx).await? {
        return Err(owner.not_found().into());
    }
    let removed =
        soft_delete_owners(&mut *tx, owner.content_type(), &[owner.owner_id()], actor, now).await?;
    if removed == 0 {
        return Err(ErrorCode::ImageNotFound.into());
    }

    tx.commit().await?;
    Ok(())
}

/// Hashes still referenced by a live image row
pub async fn live_hashes(pool: &PgPool) -> Result<HashSet<String>, BoxError> {
    let hashes: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT hash FROM image_files WHERE status <> 'deleted'")
            .fetch_all(pool)
            .await?;
    Ok(hashes.into_iter().collect())
}

/// Whether `hash` belongs to a live image (gate for serving files)
pub async fn is_live(pool: &PgPool, hash: &str) -> Result<bool, BoxError> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM image_files WHERE hash = $1 AND status <> 'deleted' LIMIT 1")
            .bind(hash)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, ACTOR, code};

    #[test]
    fn test_owner_mapping() {
        let owner = ImageOwner::MenuItem {
            cafe_id: 1,
            item_id: 99,
        };
        assert_eq!(owner.content_type(), ImageContentType::MenuItem);
        assert_eq!(owner.owner_id(), 99);
        assert_eq!(owner.not_found(), ErrorCode::ItemNotFound);

        let owner = ImageOwner::Cafe { cafe_id: 5 };
        assert_eq!(owner.content_type().as_db(), "cafe");
        assert_eq!(owner.owner_id(), 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_replace_leaves_one_live_row(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "one.example").await;
        let category = fixtures::category(&pool, cafe.id, "Drinks").await;
        let owner = ImageOwner::MenuCategory {
            cafe_id: cafe.id,
            category_id: category.id,
        };

        set_image(&pool, owner, &fixtures::image('a'), ACTOR).await.unwrap();
        set_image(&pool, owner, &fixtures::image('b'), ACTOR).await.unwrap();
        assert_eq!(fixtures::live_images(&pool, "menu_category", category.id).await, 1);

        let live = live_hashes(&pool).await.unwrap();
        assert!(live.contains(&"b".repeat(64)));
        assert!(!live.contains(&"a".repeat(64)));
        assert!(!is_live(&pool, &"a".repeat(64)).await.unwrap());

        let category = crate::db::categories::find(&pool, cafe.id, category.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(category.image, Some("b".repeat(64)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_clear_image(pool: PgPool) {
        let cafe = fixtures::cafe(&pool, "clear.example").await;
        let owner = ImageOwner::Cafe { cafe_id: cafe.id };

        assert_eq!(
            code(clear_image(&pool, owner, ACTOR).await),
            ErrorCode::ImageNotFound
        );

        set_image(&pool, owner, &fixtures::image('c'), ACTOR).await.unwrap();
        clear_image(&pool, owner, ACTOR).await.unwrap();
        assert_eq!(fixtures::live_images(&pool, "cafe", cafe.id).await, 0);
        assert!(!is_live(&pool, &"c".repeat(64)).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_owner_of_other_cafe_not_found(pool: PgPool) {
        let mine = fixtures::cafe(&pool, "mine.example").await;
        let theirs = fixtures::cafe(&pool, "theirs.example").await;
        let category = fixtures::category(&pool, theirs.id, "Cakes").await;

        let owner = ImageOwner::MenuCategory {
            cafe_id: mine.id,
            category_id: category.id,
        };
        assert_eq!(
            code(set_image(&pool, owner, &fixtures::image('d'), ACTOR).await),
            ErrorCode::CategoryNotFound
        );
        assert_eq!(fixtures::live_images(&pool, "menu_category", category.id).await, 0);
    }
}
