//! Lifecycle status, image ownership and role enums
//!
//! All three are stored as lower-case TEXT columns.

use serde::{Deserialize, Serialize};

/// Row lifecycle status
///
/// `Deleted` is the soft-delete marker: such rows are never returned by
/// business queries. `Passive` rows are visible to the owning admin but
/// hidden from the public storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Active,
    Passive,
    Deleted,
}

impl EntityStatus {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passive => "passive",
            Self::Deleted => "deleted",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "passive" => Some(Self::Passive),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Whether the row may be shown on the public storefront
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Which kind of entity an image row belongs to
///
/// `image_files.owner_id` is interpreted against the table named by this
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageContentType {
    Admin,
    SuperAdmin,
    Cafe,
    MenuCategory,
    MenuItem,
    Menu,
}

impl ImageContentType {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
            Self::Cafe => "cafe",
            Self::MenuCategory => "menu_category",
            Self::MenuItem => "menu_item",
            Self::Menu => "menu",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            "cafe" => Some(Self::Cafe),
            "menu_category" => Some(Self::MenuCategory),
            "menu_item" => Some(Self::MenuItem),
            "menu" => Some(Self::Menu),
            _ => None,
        }
    }
}

/// Account role, carried as the `role` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }
}

/// Claim type holding the [`Role`]
pub const CLAIM_ROLE: &str = "role";
/// Claim type holding the admin's café id
pub const CLAIM_CAFE_ID: &str = "cafe_id";

#[cfg(feature = "db")]
macro_rules! impl_pg_text {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                <$ty>::from_db(s)
                    .ok_or_else(|| format!("unknown {} value: {s}", stringify!($ty)).into())
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_db(), buf)
            }
        }
    };
}

#[cfg(feature = "db")]
impl_pg_text!(EntityStatus);
#[cfg(feature = "db")]
impl_pg_text!(ImageContentType);
#[cfg(feature = "db")]
impl_pg_text!(Role);
