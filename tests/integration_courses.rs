mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    TestUser, body_json, count_rows, create_admin, create_course, create_editor, empty_request,
    expect, json_request, send, test_app, test_state,
};
use coursehub::coursehub_core::Capability;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;

fn upload_request(course_id: &str, name: &str, user: &TestUser, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/courses/{}/files?name={}", course_id, name))
        .header("content-type", "application/octet-stream")
        .header("authorization", user.bearer())
        .body(Body::from(content.to_vec()))
        .unwrap()
}

async fn upload(app: &axum::Router, course_id: &str, name: &str, user: &TestUser) -> Value {
    expect(
        app,
        upload_request(course_id, name, user, b"week one slides"),
        StatusCode::CREATED,
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_and_read_publicly(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &[Capability::CoursesEdit]).await;

    let course = create_course(&app, &editor, "CSE 4101", "Algorithms").await;
    assert_eq!(course["id"], "cse-4101");
    assert_eq!(course["code"], "CSE 4101");

    let list = expect(&app, empty_request("GET", "/api/courses", None), StatusCode::OK).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let updated = expect(
        &app,
        json_request(
            "PUT",
            "/api/courses/cse-4101",
            Some(&editor),
            json!({ "credits": 4.0 }),
        ),
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["credits"], 4.0);
    assert_eq!(updated["title"], "Algorithms");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_course_rules(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &[Capability::CoursesEdit]).await;
    let outsider = create_editor(&pool, "out", &[Capability::NoticesEdit]).await;

    create_course(&app, &editor, "CSE 4101", "Algorithms").await;

    expect(
        &app,
        json_request(
            "POST",
            "/api/courses",
            Some(&editor),
            json!({ "code": "cse-4101", "title": "Same slug" }),
        ),
        StatusCode::BAD_REQUEST,
    )
    .await;
    let invalid = expect(
        &app,
        json_request(
            "POST",
            "/api/courses",
            Some(&editor),
            json!({ "code": "CSE 9", "title": "Too many credits", "credits": 45.0 }),
        ),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert_eq!(invalid["error"], "credits must be between 0 and 30");
    assert_eq!(
        invalid["fields"]["credits"],
        json!(["credits must be between 0 and 30"])
    );
    expect(
        &app,
        json_request(
            "POST",
            "/api/courses",
            Some(&outsider),
            json!({ "code": "CSE 1", "title": "No capability" }),
        ),
        StatusCode::FORBIDDEN,
    )
    .await;
    expect(
        &app,
        json_request(
            "PUT",
            "/api/courses/missing",
            Some(&editor),
            json!({ "title": "Ghost" }),
        ),
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(count_rows(&pool, "courses").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_list_and_download(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[Capability::CourseMaterialsEdit]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    let file = upload(&app, "cse-4101", "Lecture%201.pdf", &editor).await;

    assert_eq!(file["name"], "Lecture_1.pdf");
    assert_eq!(file["size_bytes"], 15);
    assert!(file.get("storage_key").is_none());
    let url = file["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/files/courses/cse-4101/"));
    assert!(url.ends_with("-Lecture_1.pdf"));

    let files = expect(
        &app,
        empty_request("GET", "/api/courses/cse-4101/files", None),
        StatusCode::OK,
    )
    .await;
    assert_eq!(files[0]["url"], url.as_str());

    let response = send(&app, empty_request("GET", &url, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"week one slides");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upload_rules(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[Capability::CoursesEdit]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;

    expect(
        &app,
        upload_request("cse-4101", "empty.txt", &admin, b""),
        StatusCode::BAD_REQUEST,
    )
    .await;
    expect(
        &app,
        upload_request("missing", "notes.txt", &admin, b"x"),
        StatusCode::NOT_FOUND,
    )
    .await;
    // courses_edit does not imply course_materials_edit
    expect(
        &app,
        upload_request("cse-4101", "notes.txt", &editor, b"x"),
        StatusCode::FORBIDDEN,
    )
    .await;

    let oversized = vec![0u8; 1024 * 1024 + 1];
    let response = send(&app, upload_request("cse-4101", "big.bin", &admin, &oversized)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert_eq!(count_rows(&pool, "course_files").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_file_deletion_request_carries_course_id(pool: SqlitePool) {
    let state = test_state(pool.clone());
    let upload_dir = state.storage_config.upload_dir.clone();
    let app = test_app(state);
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    let file = upload(&app, "cse-4101", "notes.txt", &admin).await;
    let file_id = file["id"].as_str().unwrap();
    let stored = upload_dir.join(file["url"].as_str().unwrap().trim_start_matches("/files/"));
    assert!(stored.exists());

    let filed = expect(
        &app,
        empty_request(
            "DELETE",
            &format!("/api/courses/cse-4101/files/{}", file_id),
            Some(&editor),
        ),
        StatusCode::ACCEPTED,
    )
    .await;
    assert_eq!(filed["request"]["type"], "file");
    assert_eq!(filed["request"]["details"]["course_id"], "cse-4101");

    expect(
        &app,
        empty_request(
            "POST",
            &format!(
                "/api/deletion-requests/{}/approve",
                filed["request"]["id"].as_str().unwrap()
            ),
            Some(&admin),
        ),
        StatusCode::OK,
    )
    .await;

    assert_eq!(count_rows(&pool, "course_files").await, 0);
    assert!(!stored.exists());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_file_must_belong_to_course(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    create_course(&app, &admin, "CSE 4102", "Compilers").await;
    let file = upload(&app, "cse-4101", "notes.txt", &admin).await;

    let response = send(
        &app,
        empty_request(
            "DELETE",
            &format!("/api/courses/cse-4102/files/{}", file["id"].as_str().unwrap()),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(count_rows(&pool, "course_files").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_course_deletion_cascades(pool: SqlitePool) {
    let state = test_state(pool.clone());
    let upload_dir = state.storage_config.upload_dir.clone();
    let app = test_app(state);
    let admin = create_admin(&pool, "root").await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    create_course(&app, &admin, "CSE 4102", "Compilers").await;
    upload(&app, "cse-4101", "a.txt", &admin).await;
    upload(&app, "cse-4101", "b.txt", &admin).await;
    upload(&app, "cse-4102", "c.txt", &admin).await;
    expect(
        &app,
        json_request(
            "POST",
            "/api/courses/cse-4101/exams",
            Some(&admin),
            json!({ "title": "Midterm", "exam_date": "2026-11-02", "start_time": "09:30:00" }),
        ),
        StatusCode::CREATED,
    )
    .await;

    let response = send(&app, empty_request("DELETE", "/api/courses/cse-4101", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "deleted");

    assert_eq!(count_rows(&pool, "courses").await, 1);
    assert_eq!(count_rows(&pool, "course_files").await, 1);
    assert_eq!(count_rows(&pool, "exams").await, 0);
    assert!(!upload_dir.join("courses/cse-4101").exists());
    assert!(upload_dir.join("courses/cse-4102").exists());
}
