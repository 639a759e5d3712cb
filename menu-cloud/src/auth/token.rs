//! JWT authentication for the admin and super-admin areas

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{EntityStatus, Role};

use crate::db;
use crate::db::admins::AdminSession;
use crate::error::internal;
use crate::state::AppState;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Present for admins only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cafe_id: Option<i64>,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user extracted from the JWT
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub cafe_id: Option<i64>,
}

/// An authenticated admin and the café every admin-area query is scoped to
#[derive(Debug, Clone, Copy)]
pub struct AdminScope {
    pub user_id: i64,
    pub cafe_id: i64,
}

/// Create a JWT for a user
pub fn create_token(
    identity: &Identity,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: identity.user_id.to_string(),
        email: identity.email.clone(),
        role: identity.role,
        cafe_id: identity.cafe_id,
        exp: (now + chrono::Duration::hours(expiry_hours)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a JWT and turn its claims into an [`Identity`]
pub fn decode_identity(token: &str, secret: &str) -> Result<Identity, AppError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let claims = token_data.claims;
    let user_id = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Invalid token subject"))?;

    Ok(Identity {
        user_id,
        email: claims.email,
        role: claims.role,
        cafe_id: claims.cafe_id,
    })
}

fn bearer_identity(state: &AppState, request: &Request) -> Result<Identity, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    decode_identity(token, &state.jwt_secret)
}

/// Tokens outlive account changes; a disabled user is refused here.
async fn ensure_enabled(state: &AppState, identity: &Identity) -> Result<(), AppError> {
    let enabled = db::users::is_enabled(&state.pool, identity.user_id)
        .await
        .map_err(internal)?;
    if enabled != Some(true) {
        tracing::warn!(user_id = identity.user_id, "Token of disabled user rejected");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(())
}

/// Any logged-in user
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &request)?;
    ensure_enabled(&state, &identity).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Café admins; inserts both [`Identity`] and [`AdminScope`]
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &request)?;
    if identity.role != Role::Admin {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    let token_cafe = identity
        .cafe_id
        .ok_or_else(|| AppError::new(ErrorCode::AdminRequired))?;

    let session = db::admins::session(&state.pool, identity.user_id)
        .await
        .map_err(internal)?;
    let scope = admin_scope(&identity, token_cafe, session)?;

    request.extensions_mut().insert(scope);
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Check an admin token against the account as it is now. The café comes
/// from the database; a token minted for another café is refused.
fn admin_scope(
    identity: &Identity,
    token_cafe: i64,
    session: Option<AdminSession>,
) -> Result<AdminScope, AppError> {
    let Some(session) =
        session.filter(|s| s.is_enabled && s.admin_status == EntityStatus::Active)
    else {
        tracing::warn!(user_id = identity.user_id, "Token of disabled admin rejected");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    };
    if session.cafe_id != token_cafe {
        tracing::warn!(
            user_id = identity.user_id,
            token_cafe,
            cafe_id = session.cafe_id,
            "Admin token issued for another café"
        );
        return Err(AppError::with_message(
            ErrorCode::TokenInvalid,
            "Token was issued for another café, log in again",
        ));
    }
    if session.cafe_status != EntityStatus::Active {
        return Err(AppError::new(ErrorCode::CafeInactive));
    }
    Ok(AdminScope {
        user_id: identity.user_id,
        cafe_id: session.cafe_id,
    })
}

pub async fn require_super_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = bearer_identity(&state, &request)?;
    if identity.role != Role::SuperAdmin {
        return Err(AppError::new(ErrorCode::SuperAdminRequired));
    }
    let active = db::super_admins::is_active(&state.pool, identity.user_id)
        .await
        .map_err(internal)?;
    if !active {
        tracing::warn!(user_id = identity.user_id, "Token of inactive super admin rejected");
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Identity {
        Identity {
            user_id: 42,
            email: "owner@corner.example".into(),
            role: Role::Admin,
            cafe_id: Some(7),
        }
    }

    #[test]
    fn test_token_roundtrip_keeps_claims() {
        let token = create_token(&admin(), "secret", 1).unwrap();
        let identity = decode_identity(&token, "secret").unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.cafe_id, Some(7));
    }

    #[test]
    fn test_super_admin_token_has_no_cafe() {
        let sa = Identity {
            user_id: 1,
            email: "root@example.com".into(),
            role: Role::SuperAdmin,
            cafe_id: None,
        };
        let token = create_token(&sa, "secret", 1).unwrap();
        let identity = decode_identity(&token, "secret").unwrap();
        assert_eq!(identity.cafe_id, None);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = create_token(&admin(), "secret", 1).unwrap();
        let err = decode_identity(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_expired_token() {
        // Well past the default 60s leeway
        let token = create_token(&admin(), "secret", -1).unwrap();
        let err = decode_identity(&token, "secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn test_garbage_token() {
        let err = decode_identity("not.a.jwt", "secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    fn session(cafe_id: i64) -> AdminSession {
        AdminSession {
            is_enabled: true,
            cafe_id,
            admin_status: EntityStatus::Active,
            cafe_status: EntityStatus::Active,
        }
    }

    #[test]
    fn test_admin_scope_uses_current_cafe() {
        let scope = admin_scope(&admin(), 7, Some(session(7))).unwrap();
        assert_eq!(scope.cafe_id, 7);
        assert_eq!(scope.user_id, 42);
    }

    #[test]
    fn test_admin_moved_to_other_cafe_loses_old_token() {
        // Token still says café 7, the admin now belongs to café 8
        let err = admin_scope(&admin(), 7, Some(session(8))).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_passive_or_disabled_admin_rejected() {
        let passive = AdminSession {
            admin_status: EntityStatus::Passive,
            ..session(7)
        };
        assert_eq!(
            admin_scope(&admin(), 7, Some(passive)).unwrap_err().code,
            ErrorCode::AccountDisabled
        );

        let disabled = AdminSession {
            is_enabled: false,
            ..session(7)
        };
        assert_eq!(
            admin_scope(&admin(), 7, Some(disabled)).unwrap_err().code,
            ErrorCode::AccountDisabled
        );

        assert_eq!(
            admin_scope(&admin(), 7, None).unwrap_err().code,
            ErrorCode::AccountDisabled
        );
    }

    #[test]
    fn test_inactive_cafe_rejected() {
        let passive_cafe = AdminSession {
            cafe_status: EntityStatus::Passive,
            ..session(7)
        };
        assert_eq!(
            admin_scope(&admin(), 7, Some(passive_cafe)).unwrap_err().code,
            ErrorCode::CafeInactive
        );
    }
}
