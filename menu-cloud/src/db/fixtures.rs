//! Rows for database tests, created through the db functions themselves

use shared::error::ErrorCode;
use shared::models::{
    Admin, AdminCreate, Cafe, CafeCreate, MenuCategory, MenuCategoryCreate, MenuCreate,
    MenuDetail, MenuItem, MenuItemCreate,
};
use sqlx::PgPool;

use super::{admins, cafes, categories, items, menus};
use crate::error::{ServiceError, ServiceResult};
use crate::media::ProcessedImage;

/// Acting user id recorded in `deleted_by`
pub const ACTOR: i64 = 1;

/// Business error code of a failed call; panics on success or a db error.
pub fn code<T: std::fmt::Debug>(result: ServiceResult<T>) -> ErrorCode {
    match result {
        Err(ServiceError::App(err)) => err.code,
        other => panic!("expected a business error, got {other:?}"),
    }
}

pub async fn cafe(pool: &PgPool, domain: &str) -> Cafe {
    let data = CafeCreate {
        name: format!("Café {domain}"),
        description: None,
        address: None,
        phone: None,
        domain: domain.to_owned(),
    };
    cafes::create(pool, &data).await.unwrap()
}

pub async fn admin(pool: &PgPool, cafe_id: i64, email: &str) -> Admin {
    let data = AdminCreate {
        cafe_id,
        email: email.to_owned(),
        password: "not-hashed-in-tests".to_owned(),
        name: "Ada".to_owned(),
        surname: "Byron".to_owned(),
        phone: None,
    };
    admins::create(pool, &data, "$argon2id$fixture").await.unwrap()
}

pub async fn category(pool: &PgPool, cafe_id: i64, name: &str) -> MenuCategory {
    let data = MenuCategoryCreate {
        name: name.to_owned(),
        description: None,
        sort_order: None,
    };
    categories::create(pool, cafe_id, &data).await.unwrap()
}

pub async fn item(pool: &PgPool, cafe_id: i64, category_id: i64, name: &str) -> MenuItem {
    let data = MenuItemCreate {
        category_id,
        name: name.to_owned(),
        description: None,
        price: "3.50".parse().unwrap(),
        sort_order: None,
        is_available: None,
    };
    items::create(pool, cafe_id, &data).await.unwrap()
}

pub async fn menu(pool: &PgPool, cafe_id: i64, name: &str, category_ids: &[i64]) -> MenuDetail {
    let data = MenuCreate {
        name: name.to_owned(),
        description: None,
        is_active: false,
        category_ids: category_ids.to_vec(),
    };
    menus::create(pool, cafe_id, &data).await.unwrap()
}

/// A stored-file stand-in; only the hash matters to the database.
pub fn image(hash_byte: char) -> ProcessedImage {
    ProcessedImage {
        bytes: vec![0xFF, 0xD8, 0xFF],
        hash: hash_byte.to_string().repeat(64),
        file_name: "photo.jpg".to_owned(),
    }
}

/// Number of live image rows for one owner
pub async fn live_images(pool: &PgPool, content_type: &str, owner_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM image_files WHERE content_type = $1 AND owner_id = $2 AND status <> 'deleted'",
    )
    .bind(content_type)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
