//! Menu model

use serde::{Deserialize, Serialize};

use super::status::EntityStatus;
use super::validate;
use crate::error::AppError;

/// Menu entity
///
/// A café may keep several menus (e.g. "Summer", "Breakfast") but at most
/// one of them is active and served on the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Menu {
    pub id: i64,
    pub cafe_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub status: EntityStatus,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Menu with its linked categories, in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDetail {
    #[serde(flatten)]
    pub menu: Menu,
    pub category_ids: Vec<i64>,
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCreate {
    pub name: String,
    pub description: Option<String>,
    /// Activate right away (deactivates the café's current menu)
    #[serde(default)]
    pub is_active: bool,
    /// Linked categories; list order is the display order
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl MenuCreate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        self.name = validate::required_name("name", &self.name)?;
        self.description = validate::optional_text("description", self.description.as_deref())?;
        self.category_ids = dedup_ids(self.category_ids);
        Ok(self)
    }
}

/// Update menu payload
///
/// `category_ids: Some(..)` replaces the whole link set (and its order).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<EntityStatus>,
    pub category_ids: Option<Vec<i64>>,
}

impl MenuUpdate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate::required_name("name", name)?);
        }
        if self.status == Some(EntityStatus::Deleted) {
            return Err(AppError::field("status", "Use the delete endpoint to delete a menu"));
        }
        self.category_ids = self.category_ids.map(dedup_ids);
        self.description = validate::clearable_text("description", self.description.take())?;
        Ok(self)
    }
}

/// Drop repeated ids, keeping the first occurrence's position.
pub fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_position() {
        assert_eq!(dedup_ids(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_ids(vec![]).is_empty());
    }

    #[test]
    fn test_menu_create_defaults_from_json() {
        let create: MenuCreate = serde_json::from_str(r#"{"name":" Main "}"#).unwrap();
        let create = create.normalize().unwrap();
        assert_eq!(create.name, "Main");
        assert!(!create.is_active);
        assert!(create.category_ids.is_empty());
    }

    #[test]
    fn test_menu_update_links_are_deduplicated() {
        let update = MenuUpdate {
            category_ids: Some(vec![5, 5, 6]),
            ..Default::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(update.category_ids, Some(vec![5, 6]));
    }

    #[test]
    fn test_menu_detail_flattens() {
        let detail = MenuDetail {
            menu: Menu {
                id: 1,
                cafe_id: 2,
                name: "Main".into(),
                description: None,
                is_active: true,
                status: EntityStatus::Active,
                image: None,
                created_at: 0,
                updated_at: 0,
            },
            category_ids: vec![10, 11],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "Main");
        assert_eq!(json["status"], "active");
        assert_eq!(json["category_ids"], serde_json::json!([10, 11]));
    }

    #[test]
    fn test_menu_update_description_checked() {
        let u = MenuUpdate {
            description: Some("x".repeat(validate::MAX_TEXT_LEN + 1)),
            ..Default::default()
        };
        assert!(u.normalize().is_err());
    }
}
