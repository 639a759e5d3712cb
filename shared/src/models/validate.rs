//! Input validation helpers shared by the request payloads

use crate::error::{AppError, ErrorCode};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_TEXT_LEN: usize = 1000;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Trim a required name and check its length.
pub fn required_name(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::field(field, format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::field(
            field,
            format!("{field} must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free-text field; blank collapses to `None`.
pub fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if v.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::field(
            field,
            format!("{field} must be at most {MAX_TEXT_LEN} characters"),
        ));
    }
    Ok(Some(v.to_string()))
}

/// Optional text on a partial update: `None` leaves the column alone,
/// blank clears it (`Some("")`), anything else is trimmed and length-checked.
pub fn clearable_text(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => Ok(Some(optional_text(field, Some(&v))?.unwrap_or_default())),
    }
}

/// Lower-case and sanity-check an e-mail address.
pub fn email(value: &str) -> Result<String, AppError> {
    let email = value.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::field("email", "Email address is not valid"));
    }
    Ok(email)
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_name_trims() {
        assert_eq!(required_name("name", "  Espresso ").unwrap(), "Espresso");
    }

    #[test]
    fn test_required_name_rejects_blank_and_long() {
        let err = required_name("name", "   ").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap().get("field").unwrap(), "name");

        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(required_name("name", &long).is_err());
        assert!(required_name("name", &"é".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text("description", Some("  ")).unwrap(), None);
        assert_eq!(optional_text("description", None).unwrap(), None);
        assert_eq!(
            optional_text("description", Some(" hot ")).unwrap(),
            Some("hot".to_string())
        );
    }

    #[test]
    fn test_clearable_text() {
        assert_eq!(clearable_text("phone", None).unwrap(), None);
        assert_eq!(clearable_text("phone", Some("   ".into())).unwrap(), Some(String::new()));
        assert_eq!(
            clearable_text("phone", Some(" 555 ".into())).unwrap(),
            Some("555".to_string())
        );

        let err = clearable_text("description", Some("x".repeat(MAX_TEXT_LEN + 1))).unwrap_err();
        assert_eq!(err.details.unwrap().get("field").unwrap(), "description");
    }

    #[test]
    fn test_email_normalized() {
        assert_eq!(email(" Owner@Cafe.COM ").unwrap(), "owner@cafe.com");
        assert!(email("owner").is_err());
        assert!(email("@cafe.com").is_err());
        assert!(email("owner@cafe").is_err());
        assert!(email("owner@.com").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(password("12345678").is_ok());
        assert_eq!(
            password("short").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
    }
}
