//! Unified error codes for the menu platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant (café) errors
//! - 4xxx: Menu errors
//! - 5xxx: Menu category errors
//! - 6xxx: Menu item errors
//! - 7xxx: Image errors
//! - 8xxx: Account (admin / super admin) errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontends can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    NotAuthenticated = 1001,
    InvalidCredentials = 1002,
    TokenExpired = 1003,
    TokenInvalid = 1004,
    AccountDisabled = 1005,
    PasswordTooShort = 1006,
    TooManyRequests = 1007,

    // ==================== 2xxx: Permission ====================
    PermissionDenied = 2001,
    AdminRequired = 2002,
    SuperAdminRequired = 2003,

    // ==================== 3xxx: Tenant ====================
    /// No café is bound to the requesting host
    TenantNotFound = 3001,
    CafeNotFound = 3002,
    CafeDomainExists = 3003,
    CafeInactive = 3004,
    InvalidDomain = 3005,

    // ==================== 4xxx: Menu ====================
    MenuNotFound = 4001,
    NoActiveMenu = 4002,

    // ==================== 5xxx: Category ====================
    CategoryNotFound = 5001,
    /// Category id does not belong to the caller's café
    CategoryNotInCafe = 5002,

    // ==================== 6xxx: Item ====================
    ItemNotFound = 6001,
    InvalidPrice = 6002,

    // ==================== 7xxx: Image ====================
    ImageNotFound = 7001,
    ImageTooLarge = 7002,
    UnsupportedImageFormat = 7003,
    InvalidImage = 7004,

    // ==================== 8xxx: Account ====================
    AdminNotFound = 8001,
    EmailExists = 8002,
    SuperAdminNotFound = 8003,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    ConfigError = 9003,
    StorageError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooShort => "Password is too short",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Café administrator role is required",
            ErrorCode::SuperAdminRequired => "Super administrator role is required",

            // Tenant
            ErrorCode::TenantNotFound => "No café is served at this address",
            ErrorCode::CafeNotFound => "Café not found",
            ErrorCode::CafeDomainExists => "Domain is already used by another café",
            ErrorCode::CafeInactive => "Café is not active",
            ErrorCode::InvalidDomain => "Domain is not valid",

            // Menu
            ErrorCode::MenuNotFound => "Menu not found",
            ErrorCode::NoActiveMenu => "Café has no active menu",

            // Category
            ErrorCode::CategoryNotFound => "Menu category not found",
            ErrorCode::CategoryNotInCafe => "Menu category does not belong to this café",

            // Item
            ErrorCode::ItemNotFound => "Menu item not found",
            ErrorCode::InvalidPrice => "Price must be zero or greater",

            // Image
            ErrorCode::ImageNotFound => "Image not found",
            ErrorCode::ImageTooLarge => "Image file is too large",
            ErrorCode::UnsupportedImageFormat => "Image format is not supported",
            ErrorCode::InvalidImage => "File is not a valid image",

            // Account
            ErrorCode::AdminNotFound => "Admin not found",
            ErrorCode::EmailExists => "Email is already registered",
            ErrorCode::SuperAdminNotFound => "Super admin not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageError => "File storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::PasswordTooShort),
            1007 => Ok(ErrorCode::TooManyRequests),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),
            2003 => Ok(ErrorCode::SuperAdminRequired),

            // Tenant
            3001 => Ok(ErrorCode::TenantNotFound),
            3002 => Ok(ErrorCode::CafeNotFound),
            3003 => Ok(ErrorCode::CafeDomainExists),
            3004 => Ok(ErrorCode::CafeInactive),
            3005 => Ok(ErrorCode::InvalidDomain),

            // Menu
            4001 => Ok(ErrorCode::MenuNotFound),
            4002 => Ok(ErrorCode::NoActiveMenu),

            // Category
            5001 => Ok(ErrorCode::CategoryNotFound),
            5002 => Ok(ErrorCode::CategoryNotInCafe),

            // Item
            6001 => Ok(ErrorCode::ItemNotFound),
            6002 => Ok(ErrorCode::InvalidPrice),

            // Image
            7001 => Ok(ErrorCode::ImageNotFound),
            7002 => Ok(ErrorCode::ImageTooLarge),
            7003 => Ok(ErrorCode::UnsupportedImageFormat),
            7004 => Ok(ErrorCode::InvalidImage),

            // Account
            8001 => Ok(ErrorCode::AdminNotFound),
            8002 => Ok(ErrorCode::EmailExists),
            8003 => Ok(ErrorCode::SuperAdminNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::SuperAdminRequired.code(), 2003);
        assert_eq!(ErrorCode::TenantNotFound.code(), 3001);
        assert_eq!(ErrorCode::NoActiveMenu.code(), 4002);
        assert_eq!(ErrorCode::CategoryNotInCafe.code(), 5002);
        assert_eq!(ErrorCode::InvalidPrice.code(), 6002);
        assert_eq!(ErrorCode::ImageTooLarge.code(), 7002);
        assert_eq!(ErrorCode::EmailExists.code(), 8002);
        assert_eq!(ErrorCode::StorageError.code(), 9004);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_covers_every_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::ValueOutOfRange,
            ErrorCode::TooManyRequests,
            ErrorCode::AdminRequired,
            ErrorCode::InvalidDomain,
            ErrorCode::MenuNotFound,
            ErrorCode::CategoryNotFound,
            ErrorCode::ItemNotFound,
            ErrorCode::InvalidImage,
            ErrorCode::SuperAdminNotFound,
            ErrorCode::ConfigError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(ErrorCode::try_from(42), Err(InvalidErrorCode(42)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::CafeNotFound).unwrap();
        assert_eq!(json, "3002");

        let code: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(code, ErrorCode::MenuNotFound);

        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::ImageNotFound), "7001");
        assert_eq!(
            format!("{}", InvalidErrorCode(77)),
            "invalid error code: 77"
        );
    }
}
