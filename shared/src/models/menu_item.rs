//! Menu item model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::EntityStatus;
use super::validate;
use crate::error::{AppError, ErrorCode};

/// Menu item entity (belongs to one category)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sort_order: i32,
    /// Temporarily sold out items stay listed for the admin only
    pub is_available: bool,
    pub status: EntityStatus,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sort_order: Option<i32>,
    pub is_available: Option<bool>,
}

impl MenuItemCreate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        self.name = validate::required_name("name", &self.name)?;
        self.description = validate::optional_text("description", self.description.as_deref())?;
        self.price = normalize_price(self.price)?;
        Ok(self)
    }
}

/// Update item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    /// Move to another category of the same café
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub sort_order: Option<i32>,
    pub is_available: Option<bool>,
    pub status: Option<EntityStatus>,
}

impl MenuItemUpdate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate::required_name("name", name)?);
        }
        if let Some(price) = self.price {
            self.price = Some(normalize_price(price)?);
        }
        if self.status == Some(EntityStatus::Deleted) {
            return Err(AppError::field("status", "Use the delete endpoint to delete an item"));
        }
        self.description = validate::clearable_text("description", self.description.take())?;
        Ok(self)
    }
}

/// Prices are stored with two decimal places and may not be negative.
pub fn normalize_price(price: Decimal) -> Result<Decimal, AppError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::new(ErrorCode::InvalidPrice).with_detail("field", "price"));
    }
    Ok(price.round_dp(2))
}
