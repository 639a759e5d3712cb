//! Menu category model

use serde::{Deserialize, Serialize};

use super::status::EntityStatus;
use super::validate;
use crate::error::AppError;

/// Menu category entity (belongs to one café, linked to many menus)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuCategory {
    pub id: i64,
    pub cafe_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub status: EntityStatus,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategoryCreate {
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

impl MenuCategoryCreate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        self.name = validate::required_name("name", &self.name)?;
        self.description = validate::optional_text("description", self.description.as_deref())?;
        Ok(self)
    }
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuCategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub status: Option<EntityStatus>,
}

impl MenuCategoryUpdate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate::required_name("name", name)?);
        }
        if self.status == Some(EntityStatus::Deleted) {
            return Err(AppError::field(
                "status",
                "Use the delete endpoint to delete a category",
            ));
        }
        self.description = validate::clearable_text("description", self.description.take())?;
        Ok(self)
    }
}
