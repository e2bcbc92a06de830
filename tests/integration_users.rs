mod common;

use axum::http::StatusCode;
use common::{
    TEST_PASSWORD, audit_actions, count_rows, create_admin, create_editor, empty_request, expect,
    json_request, test_app, test_state,
};
use coursehub::coursehub_core::Capability;
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_returns_token_and_user(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    create_editor(&pool, "grace", &[Capability::ExamsEdit]).await;

    let body = expect(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "grace", "password": TEST_PASSWORD }),
        ),
        StatusCode::OK,
    )
    .await;

    assert!(body["access_token"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["username"], "grace");
    assert_eq!(body["user"]["role"], "editor");
    assert_eq!(body["user"]["permissions"]["exams_edit"], true);
    assert!(body["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_with_wrong_password(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    create_editor(&pool, "grace", &[]).await;

    expect(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "grace", "password": "wrong-password" }),
        ),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    expect(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "nobody", "password": TEST_PASSWORD }),
        ),
        StatusCode::UNAUTHORIZED,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_creates_editor(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;

    let body = expect(
        &app,
        json_request(
            "POST",
            "/api/users",
            Some(&admin),
            json!({
                "username": "ada",
                "password": "longenough",
                "name": "Ada",
                "permissions": { "courses_edit": true }
            }),
        ),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(body["role"], "editor");
    assert_eq!(body["permissions"]["courses_edit"], true);
    assert_eq!(audit_actions(&pool).await[0], "CREATE_USER");

    expect(
        &app,
        json_request(
            "POST",
            "/api/users",
            Some(&admin),
            json!({ "username": "ada", "password": "longenough", "name": "Ada Again" }),
        ),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_editor_cannot_manage_users(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &Capability::ALL).await;

    expect(
        &app,
        empty_request("GET", "/api/users", Some(&editor)),
        StatusCode::FORBIDDEN,
    )
    .await;
    expect(
        &app,
        json_request(
            "POST",
            "/api/users",
            Some(&editor),
            json!({ "username": "sneaky", "password": "longenough", "name": "S", "role": "admin" }),
        ),
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(count_rows(&pool, "users").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_last_admin_cannot_be_deleted_or_demoted(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;

    expect(
        &app,
        empty_request("DELETE", &format!("/api/users/{}", admin.id), Some(&admin)),
        StatusCode::CONFLICT,
    )
    .await;
    expect(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{}", admin.id),
            Some(&admin),
            json!({ "role": "editor" }),
        ),
        StatusCode::CONFLICT,
    )
    .await;

    let (role,): (String,) = sqlx::query_as("SELECT role FROM users WHERE id = ?")
        .bind(&admin.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(role, "admin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_admin_can_be_removed(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let other = create_admin(&pool, "deputy").await;

    expect(
        &app,
        empty_request("DELETE", &format!("/api/users/{}", other.id), Some(&admin)),
        StatusCode::OK,
    )
    .await;
    expect(
        &app,
        empty_request("DELETE", "/api/users/missing", Some(&admin)),
        StatusCode::NOT_FOUND,
    )
    .await;

    // The deleted account's token stops working immediately.
    expect(
        &app,
        empty_request("GET", "/api/users/profile", Some(&other)),
        StatusCode::UNAUTHORIZED,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_revoked_capability_applies_to_existing_token(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[Capability::NoticesEdit]).await;

    expect(
        &app,
        json_request(
            "POST",
            "/api/notices",
            Some(&editor),
            json!({ "title": "Exam week", "body": "Library opens 24h" }),
        ),
        StatusCode::CREATED,
    )
    .await;

    expect(
        &app,
        json_request(
            "PUT",
            &format!("/api/users/{}", editor.id),
            Some(&admin),
            json!({ "permissions": { "notices_edit": false } }),
        ),
        StatusCode::OK,
    )
    .await;

    expect(
        &app,
        json_request(
            "POST",
            "/api/notices",
            Some(&editor),
            json!({ "title": "Another", "body": "Denied" }),
        ),
        StatusCode::FORBIDDEN,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_and_password_change(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &[]).await;

    let body = expect(
        &app,
        empty_request("GET", "/api/users/profile", Some(&editor)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["username"], "ed");

    expect(
        &app,
        json_request(
            "POST",
            "/api/users/profile/change-password",
            Some(&editor),
            json!({ "current_password": "not-it", "new_password": "brandnewpass" }),
        ),
        StatusCode::BAD_REQUEST,
    )
    .await;
    expect(
        &app,
        json_request(
            "POST",
            "/api/users/profile/change-password",
            Some(&editor),
            json!({ "current_password": TEST_PASSWORD, "new_password": "brandnewpass" }),
        ),
        StatusCode::OK,
    )
    .await;
    expect(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "ed", "password": "brandnewpass" }),
        ),
        StatusCode::OK,
    )
    .await;
}
