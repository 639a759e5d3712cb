//! Public storefront view (what a customer sees after scanning the QR code)

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cafe::Cafe;
use super::menu::Menu;
use super::menu_category::MenuCategory;
use super::menu_item::MenuItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMenu {
    pub cafe: PublicCafe,
    pub menu: PublicMenuInfo,
    pub categories: Vec<PublicCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCafe {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMenuInfo {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub items: Vec<PublicItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
}

impl PublicMenu {
    /// Build the storefront tree.
    ///
    /// `categories` must already be in menu display order. Items are
    /// grouped under their category and ordered by `(sort_order, id)`;
    /// non-public categories and unavailable or non-public items are left
    /// out. `image_url` turns a stored image hash into a client URL.
    pub fn assemble(
        cafe: Cafe,
        menu: Menu,
        categories: Vec<MenuCategory>,
        items: Vec<MenuItem>,
        image_url: impl Fn(&str) -> String,
    ) -> Self {
        let mut by_category: HashMap<i64, Vec<MenuItem>> = HashMap::new();
        for item in items
            .into_iter()
            .filter(|i| i.is_available && i.status.is_public())
        {
            by_category.entry(item.category_id).or_default().push(item);
        }

        let url = |hash: Option<String>| hash.as_deref().map(&image_url);

        let categories = categories
            .into_iter()
            .filter(|c| c.status.is_public())
            .map(|c| {
                let mut items = by_category.remove(&c.id).unwrap_or_default();
                items.sort_by_key(|i| (i.sort_order, i.id));
                PublicCategory {
                    id: c.id,
                    name: c.name,
                    description: c.description,
                    image_url: url(c.image),
                    items: items
                        .into_iter()
                        .map(|i| PublicItem {
                            id: i.id,
                            name: i.name,
                            description: i.description,
                            price: i.price,
                            image_url: url(i.image),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            cafe: PublicCafe {
                name: cafe.name,
                description: cafe.description,
                address: cafe.address,
                phone: cafe.phone,
                image_url: url(cafe.image),
            },
            menu: PublicMenuInfo {
                id: menu.id,
                name: menu.name,
                description: menu.description,
                image_url: url(menu.image),
            },
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::EntityStatus;

    fn cafe() -> Cafe {
        Cafe {
            id: 1,
            name: "Corner".into(),
            description: None,
            address: None,
            phone: None,
            domain: "corner.example.com".into(),
            status: EntityStatus::Active,
            image: Some("abc".into()),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn menu() -> Menu {
        Menu {
            id: 10,
            cafe_id: 1,
            name: "Main".into(),
            description: None,
            is_active: true,
            status: EntityStatus::Active,
            image: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn category(id: i64, status: EntityStatus) -> MenuCategory {
        MenuCategory {
            id,
            cafe_id: 1,
            name: format!("cat-{id}"),
            description: None,
            sort_order: 0,
            status,
            image: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn item(id: i64, category_id: i64, sort_order: i32, available: bool) -> MenuItem {
        MenuItem {
            id,
            category_id,
            name: format!("item-{id}"),
            description: None,
            price: Decimal::new(350, 2),
            sort_order,
            is_available: available,
            status: EntityStatus::Active,
            image: Some(format!("h{id}")),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_assemble_keeps_category_order_and_sorts_items() {
        let public = PublicMenu::assemble(
            cafe(),
            menu(),
            vec![category(200, EntityStatus::Active), category(100, EntityStatus::Active)],
            vec![item(3, 100, 2, true), item(2, 100, 1, true), item(1, 200, 0, true)],
            |h| format!("/media/{h}"),
        );

        let ids: Vec<i64> = public.categories.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![200, 100]);
        let item_ids: Vec<i64> = public.categories[1].items.iter().map(|i| i.id).collect();
        assert_eq!(item_ids, vec![2, 3]);
        assert_eq!(public.cafe.image_url.as_deref(), Some("/media/abc"));
        assert_eq!(
            public.categories[0].items[0].image_url.as_deref(),
            Some("/media/h1")
        );
        assert_eq!(public.menu.image_url, None);
    }

    #[test]
    fn test_assemble_hides_passive_and_unavailable() {
        let public = PublicMenu::assemble(
            cafe(),
            menu(),
            vec![category(1, EntityStatus::Passive), category(2, EntityStatus::Active)],
            vec![item(5, 1, 0, true), item(6, 2, 0, false), item(7, 2, 1, true)],
            |h| h.to_string(),
        );

        assert_eq!(public.categories.len(), 1);
        assert_eq!(public.categories[0].id, 2);
        assert_eq!(public.categories[0].items.len(), 1);
        assert_eq!(public.categories[0].items[0].id, 7);
    }

    #[test]
    fn test_empty_category_is_still_listed() {
        let public = PublicMenu::assemble(
            cafe(),
            menu(),
            vec![category(9, EntityStatus::Active)],
            vec![],
            |h| h.to_string(),
        );
        assert_eq!(public.categories.len(), 1);
        assert!(public.categories[0].items.is_empty());
    }
}
