//! Admin and super admin accounts
//!
//! Both are linked 1:1 to a login user (`users` table); the role and, for
//! admins, the café id travel as claims on that user.

use serde::{Deserialize, Serialize};

use super::status::EntityStatus;
use super::validate;
use crate::error::AppError;

/// Café administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Admin {
    pub id: i64,
    pub user_id: i64,
    pub cafe_id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub status: EntityStatus,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Platform super administrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SuperAdmin {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
    pub status: EntityStatus,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create admin payload (super admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreate {
    pub cafe_id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub phone: Option<String>,
}

impl AdminCreate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        self.email = validate::email(&self.email)?;
        validate::password(&self.password)?;
        self.name = validate::required_name("name", &self.name)?;
        self.surname = validate::required_name("surname", &self.surname)?;
        self.phone = validate::optional_text("phone", self.phone.as_deref())?;
        Ok(self)
    }
}

/// Update admin payload (super admin)
///
/// Changing `cafe_id` moves the admin to another café and rewrites the
/// admin's `cafe_id` claim in the same transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdate {
    pub cafe_id: Option<i64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
    pub status: Option<EntityStatus>,
}

impl AdminUpdate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if let Some(email) = self.email.as_deref() {
            self.email = Some(validate::email(email)?);
        }
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate::required_name("name", name)?);
        }
        if let Some(surname) = self.surname.as_deref() {
            self.surname = Some(validate::required_name("surname", surname)?);
        }
        if self.status == Some(EntityStatus::Deleted) {
            return Err(AppError::field("status", "Use the delete endpoint to delete an admin"));
        }
        self.phone = validate::clearable_text("phone", self.phone.take())?;
        Ok(self)
    }
}

/// Own-profile update payload (admin and super admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate::required_name("name", name)?);
        }
        if let Some(surname) = self.surname.as_deref() {
            self.surname = Some(validate::required_name("surname", surname)?);
        }
        self.phone = validate::clearable_text("phone", self.phone.take())?;
        Ok(self)
    }
}

/// Change own password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Super admin sets a new password for an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub new_password: String,
}
