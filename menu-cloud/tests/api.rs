//! Router-level tests that stop before the database: the pool is lazy and
//! never connects, so every case here must be decided by middleware or
//! request validation.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use menu_cloud::auth::Identity;
use menu_cloud::auth::token::create_token;
use menu_cloud::{AppState, Config, api};
use shared::models::Role;
use sqlx::PgPool;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

fn config(media_dir: &std::path::Path) -> Config {
    Config {
        database_url: "postgres://localhost/menu_cloud_test".into(),
        http_port: 0,
        environment: "development".into(),
        jwt_secret: SECRET.into(),
        jwt_expiry_hours: 1,
        media_dir: media_dir.to_string_lossy().into_owned(),
        public_base_url: String::new(),
        max_upload_bytes: 1024 * 1024,
        superadmin_email: None,
        superadmin_password: None,
        tenant_cache_ttl_secs: 60,
        orphan_sweep_interval_secs: 0,
        orphan_grace_secs: 3600,
        trust_forwarded_for: false,
    }
}

fn app(dir: &tempfile::TempDir) -> Router {
    let pool = PgPool::connect_lazy("postgres://localhost/menu_cloud_test").unwrap();
    let state = AppState::with_pool(pool, &config(dir.path())).unwrap();
    api::router(state)
}

fn token(role: Role, cafe_id: Option<i64>) -> String {
    let identity = Identity {
        user_id: 42,
        email: "owner@example.com".into(),
        role,
        cafe_id,
    };
    create_token(&identity, SECRET, 1).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "menu-cloud");
}

#[tokio::test]
async fn test_admin_route_requires_token() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(Request::get("/api/admin/menus").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(
            Request::get("/api/admin/menus")
                .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let identity = Identity {
        user_id: 1,
        email: "x@example.com".into(),
        role: Role::SuperAdmin,
        cafe_id: None,
    };
    let forged = create_token(&identity, "some-other-secret", 1).unwrap();

    let response = app(&dir)
        .oneshot(
            Request::get("/api/super-admin/cafes")
                .header(header::AUTHORIZATION, format!("Bearer {forged}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_token_cannot_reach_super_admin_area() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(
            Request::get("/api/super-admin/cafes")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", token(Role::Admin, Some(7))),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["code"], 2003);
}

#[tokio::test]
async fn test_super_admin_token_cannot_reach_admin_area() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(
            Request::get("/api/admin/cafe")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", token(Role::SuperAdmin, None)),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_storefront_without_host_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(Request::get("/api/menu").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_media_rejects_malformed_hash() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(
            Request::get("/media/not-a-content-hash")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rate_limited_after_five_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let attempt = || {
        Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"","password":""}"#))
            .unwrap()
    };

    for _ in 0..5 {
        let response = app.clone().oneshot(attempt()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app.clone().oneshot(attempt()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["code"], 1007);
}
