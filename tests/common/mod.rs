#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use coursehub::coursehub_auth::create_access_token;
use coursehub::coursehub_config::{
    AuditConfig, CorsConfig, JwtConfig, RateLimitConfig, StorageConfig,
};
use coursehub::coursehub_core::{Capability, PermissionMap, Role};
use coursehub::router::init_router;
use coursehub::state::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "testpass123";

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        access_token_expiry: 3600,
    }
}

/// State with a throwaway upload directory and rate limiting off.
pub fn test_state(pool: SqlitePool) -> AppState {
    let storage_config = StorageConfig {
        upload_dir: std::env::temp_dir().join(format!("coursehub-test-{}", Uuid::new_v4())),
        files_base_url: "/files".to_string(),
        max_upload_bytes: 1024 * 1024,
    };

    AppState::new(
        pool,
        test_jwt_config(),
        CorsConfig {
            allowed_origins: vec![],
        },
        RateLimitConfig::disabled(),
        storage_config,
        AuditConfig::default(),
    )
}

pub fn test_app(state: AppState) -> Router {
    init_router(state)
}

/// Inserts an account directly (low bcrypt cost) and issues a token for it.
pub async fn create_test_user(
    pool: &SqlitePool,
    username: &str,
    role: Role,
    capabilities: &[Capability],
) -> TestUser {
    let id = Uuid::new_v4().to_string();
    let hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    let permissions: PermissionMap = capabilities.iter().copied().collect();
    let now = chrono::Utc::now();

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, name, role, permissions, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(username)
    .bind(&hash)
    .bind(format!("Test {}", username))
    .bind(role.as_str())
    .bind(serde_json::to_string(&permissions).unwrap())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap();

    let token = create_access_token(
        &id,
        username,
        role,
        permissions.granted(),
        &test_jwt_config(),
    )
    .unwrap();

    TestUser {
        id,
        username: username.to_string(),
        role,
        token,
    }
}

pub async fn create_admin(pool: &SqlitePool, username: &str) -> TestUser {
    create_test_user(pool, username, Role::Admin, &[]).await
}

pub async fn create_editor(
    pool: &SqlitePool,
    username: &str,
    capabilities: &[Capability],
) -> TestUser {
    create_test_user(pool, username, Role::Editor, capabilities).await
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, user: Option<&TestUser>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("authorization", user.bearer());
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str, user: Option<&TestUser>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("authorization", user.bearer());
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Sends the request and asserts the status, returning the JSON body.
pub async fn expect(app: &Router, request: Request<Body>, status: StatusCode) -> Value {
    let response = send(app, request).await;
    let actual = response.status();
    let body = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {}", body);
    body
}

pub async fn audit_actions(pool: &SqlitePool) -> Vec<String> {
    sqlx::query_as::<_, (String,)>("SELECT action FROM audit_logs ORDER BY seq DESC")
        .fetch_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|(action,)| action)
        .collect()
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

pub async fn create_course(app: &Router, user: &TestUser, code: &str, title: &str) -> Value {
    expect(
        app,
        json_request(
            "POST",
            "/api/courses",
            Some(user),
            serde_json::json!({ "code": code, "title": title, "credits": 3.0 }),
        ),
        StatusCode::CREATED,
    )
    .await
}
