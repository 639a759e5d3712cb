//! Café (tenant) model

use serde::{Deserialize, Serialize};

use super::status::EntityStatus;
use super::validate;
use crate::error::{AppError, ErrorCode};

/// Café entity
///
/// `domain` is the host name the public menu is served from; it is stored
/// in the normalized form produced by [`normalize_host`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cafe {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub domain: String,
    pub status: EntityStatus,
    /// Hash of the café logo, if one is uploaded
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create café payload (super admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CafeCreate {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub domain: String,
}

impl CafeCreate {
    /// Validate and normalize in place
    pub fn normalize(mut self) -> Result<Self, AppError> {
        self.name = validate::required_name("name", &self.name)?;
        self.description = validate::optional_text("description", self.description.as_deref())?;
        self.address = validate::optional_text("address", self.address.as_deref())?;
        self.phone = validate::optional_text("phone", self.phone.as_deref())?;
        self.domain = normalize_domain(&self.domain)?;
        Ok(self)
    }
}

/// Update café payload (super admin): every field, including domain and status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CafeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub domain: Option<String>,
    pub status: Option<EntityStatus>,
}

impl CafeUpdate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate::required_name("name", name)?);
        }
        if let Some(domain) = self.domain.as_deref() {
            self.domain = Some(normalize_domain(domain)?);
        }
        if self.status == Some(EntityStatus::Deleted) {
            return Err(AppError::field(
                "status",
                "Use the delete endpoint to delete a café",
            ));
        }
        self.description = validate::clearable_text("description", self.description.take())?;
        self.address = validate::clearable_text("address", self.address.take())?;
        self.phone = validate::clearable_text("phone", self.phone.take())?;
        Ok(self)
    }
}

/// Update café payload (café admin): the domain and status stay with the super admin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CafeProfileUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl CafeProfileUpdate {
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(validate::required_name("name", name)?);
        }
        self.description = validate::clearable_text("description", self.description.take())?;
        self.address = validate::clearable_text("address", self.address.take())?;
        self.phone = validate::clearable_text("phone", self.phone.take())?;
        Ok(self)
    }
}

impl From<CafeProfileUpdate> for CafeUpdate {
    fn from(p: CafeProfileUpdate) -> Self {
        Self {
            name: p.name,
            description: p.description,
            address: p.address,
            phone: p.phone,
            domain: None,
            status: None,
        }
    }
}

const MAX_HOST_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Normalize an HTTP `Host` value to the form stored in `cafes.domain`.
///
/// Lower-cases, drops the port, a trailing dot and a leading `www.`.
/// Returns `None` when the value is not a plain DNS name (IP literals in
/// brackets, empty labels, illegal characters).
pub fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    if host.starts_with('[') {
        return None;
    }
    let host = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        Some(_) => return None,
        None => host.as_str(),
    };
    let host = host.strip_suffix('.').unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() || host.len() > MAX_HOST_LEN {
        return None;
    }
    let labels_ok = host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    labels_ok.then(|| host.to_string())
}

/// Normalize a domain typed by the super admin (may include scheme or path).
pub fn normalize_domain(input: &str) -> Result<String, AppError> {
    let raw = input.trim();
    let raw = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);
    let raw = raw.split(['/', '?', '#']).next().unwrap_or_default();
    normalize_host(raw).ok_or_else(|| {
        AppError::new(ErrorCode::InvalidDomain).with_detail("domain", input.to_string())
    })
}
