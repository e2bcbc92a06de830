mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    audit_actions, count_rows, create_admin, create_course, create_editor, empty_request, expect,
    json_request, test_app, test_state,
};
use coursehub::coursehub_core::Capability;
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_without_capability_files_request(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[Capability::NoticesEdit]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;

    let body = expect(
        &app,
        empty_request("DELETE", "/api/courses/cse-4101", Some(&editor)),
        StatusCode::ACCEPTED,
    )
    .await;

    assert_eq!(body["status"], "pending_approval");
    assert_eq!(body["request"]["type"], "course");
    assert_eq!(body["request"]["resource_id"], "cse-4101");
    assert_eq!(body["request"]["requested_by"], "ed");
    assert_eq!(body["request"]["status"], "pending");

    // Course is untouched until an admin decides.
    expect(
        &app,
        empty_request("GET", "/api/courses/cse-4101", None),
        StatusCode::OK,
    )
    .await;

    let pending = expect(
        &app,
        empty_request("GET", "/api/deletion-requests", Some(&admin)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert!(!audit_actions(&pool).await.contains(&"DELETE_COURSE".to_string()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_with_capability_is_immediate(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &[Capability::CoursesEdit]).await;

    create_course(&app, &editor, "EEE 2201", "Circuits").await;

    let body = expect(
        &app,
        empty_request("DELETE", "/api/courses/eee-2201", Some(&editor)),
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["status"], "deleted");
    assert_eq!(body["type"], "course");
    assert_eq!(body["resource_id"], "eee-2201");
    assert_eq!(count_rows(&pool, "courses").await, 0);
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
    assert_eq!(audit_actions(&pool).await[0], "DELETE_COURSE");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_target_files_nothing(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &[]).await;

    expect(
        &app,
        empty_request("DELETE", "/api/courses/nope", Some(&editor)),
        StatusCode::NOT_FOUND,
    )
    .await;

    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_requires_authentication(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    create_course(&app, &admin, "CSE 1101", "Intro").await;

    expect(
        &app,
        empty_request("DELETE", "/api/courses/cse-1101", None),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(count_rows(&pool, "courses").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_deletes_resource_and_request(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    let filed = expect(
        &app,
        empty_request("DELETE", "/api/courses/cse-4101", Some(&editor)),
        StatusCode::ACCEPTED,
    )
    .await;
    let request_id = filed["request"]["id"].as_str().unwrap().to_string();

    let body = expect(
        &app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/approve", request_id),
            Some(&admin),
        ),
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["status"], "approved");
    assert_eq!(body["type"], "course");
    assert_eq!(body["resource_id"], "cse-4101");
    assert_eq!(count_rows(&pool, "courses").await, 0);
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
    assert_eq!(audit_actions(&pool).await[0], "APPROVE_DELETION");

    // A second approval finds nothing.
    expect(
        &app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/approve", request_id),
            Some(&admin),
        ),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reject_keeps_resource(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    let filed = expect(
        &app,
        empty_request("DELETE", "/api/courses/cse-4101", Some(&editor)),
        StatusCode::ACCEPTED,
    )
    .await;
    let request_id = filed["request"]["id"].as_str().unwrap().to_string();

    let body = expect(
        &app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/reject", request_id),
            Some(&admin),
        ),
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["status"], "rejected");
    assert_eq!(body["request"]["id"], request_id.as_str());
    assert_eq!(count_rows(&pool, "courses").await, 1);
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
    assert_eq!(audit_actions(&pool).await[0], "REJECT_DELETION");

    expect(
        &app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/reject", request_id),
            Some(&admin),
        ),
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_unknown_type_stays_pending(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    let filed = expect(
        &app,
        json_request(
            "POST",
            "/api/deletion-requests",
            Some(&editor),
            json!({ "type": "spaceship", "resource_id": "x-1" }),
        ),
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(filed["requested_by"], "ed");

    expect(
        &app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/approve", filed["id"].as_str().unwrap()),
            Some(&admin),
        ),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let pending = expect(
        &app,
        empty_request("GET", "/api/deletion-requests", Some(&admin)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["status"], "pending");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_file_without_course_id_is_bad_request(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;

    let filed = expect(
        &app,
        json_request(
            "POST",
            "/api/deletion-requests",
            Some(&admin),
            json!({ "type": "file", "resourceId": "f-1", "details": {} }),
        ),
        StatusCode::CREATED,
    )
    .await;

    expect(
        &app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/approve", filed["id"].as_str().unwrap()),
            Some(&admin),
        ),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(count_rows(&pool, "deletion_requests").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_vanished_target_returns_to_pending(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;

    let filed = expect(
        &app,
        json_request(
            "POST",
            "/api/deletion-requests",
            Some(&admin),
            json!({ "type": "notice", "resource_id": "gone" }),
        ),
        StatusCode::CREATED,
    )
    .await;

    expect(
        &app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/approve", filed["id"].as_str().unwrap()),
            Some(&admin),
        ),
        StatusCode::NOT_FOUND,
    )
    .await;

    let (status,): (String,) = sqlx::query_as("SELECT status FROM deletion_requests WHERE id = ?")
        .bind(filed["id"].as_str().unwrap())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "pending");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_request_mid_approval_conflicts(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;

    let filed = expect(
        &app,
        json_request(
            "POST",
            "/api/deletion-requests",
            Some(&admin),
            json!({ "type": "course", "resource_id": "cse-1" }),
        ),
        StatusCode::CREATED,
    )
    .await;
    let id = filed["id"].as_str().unwrap();

    sqlx::query("UPDATE deletion_requests SET status = 'approved', claimed_at = ? WHERE id = ?")
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    expect(
        &app,
        empty_request("POST", &format!("/api/deletion-requests/{}/reject", id), Some(&admin)),
        StatusCode::CONFLICT,
    )
    .await;
    expect(
        &app,
        empty_request("POST", &format!("/api/deletion-requests/{}/approve", id), Some(&admin)),
        StatusCode::CONFLICT,
    )
    .await;

    let pending = expect(
        &app,
        empty_request("GET", "/api/deletion-requests", Some(&admin)),
        StatusCode::OK,
    )
    .await;
    assert!(pending.as_array().unwrap().is_empty());
}

async fn abandon_claim(pool: &SqlitePool, id: &str, claimed_at: Option<i64>) {
    sqlx::query("UPDATE deletion_requests SET status = 'approved', claimed_at = ? WHERE id = ?")
        .bind(claimed_at)
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_abandoned_claim_can_be_approved(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    let filed = expect(
        &app,
        empty_request("DELETE", "/api/courses/cse-4101", Some(&editor)),
        StatusCode::ACCEPTED,
    )
    .await;
    let id = filed["request"]["id"].as_str().unwrap();

    // Approval interrupted before the row was removed.
    abandon_claim(&pool, id, None).await;

    let pending = expect(
        &app,
        empty_request("GET", "/api/deletion-requests", Some(&admin)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["status"], "pending");

    expect(
        &app,
        empty_request("POST", &format!("/api/deletion-requests/{}/approve", id), Some(&admin)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(count_rows(&pool, "courses").await, 0);
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
    assert_eq!(audit_actions(&pool).await[0], "APPROVE_DELETION");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_claim_can_be_rejected(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    let filed = expect(
        &app,
        empty_request("DELETE", "/api/courses/cse-4101", Some(&editor)),
        StatusCode::ACCEPTED,
    )
    .await;
    let id = filed["request"]["id"].as_str().unwrap();

    let stale = (Utc::now() - Duration::minutes(30)).timestamp_millis();
    abandon_claim(&pool, id, Some(stale)).await;

    let body = expect(
        &app,
        empty_request("POST", &format!("/api/deletion-requests/{}/reject", id), Some(&admin)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["status"], "rejected");
    assert_eq!(count_rows(&pool, "courses").await, 1);
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_admins_moderate(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &Capability::ALL).await;

    expect(
        &app,
        empty_request("GET", "/api/deletion-requests", Some(&editor)),
        StatusCode::FORBIDDEN,
    )
    .await;
    expect(
        &app,
        empty_request("POST", "/api/deletion-requests/any/approve", Some(&editor)),
        StatusCode::FORBIDDEN,
    )
    .await;
    expect(
        &app,
        empty_request("POST", "/api/deletion-requests/any/reject", Some(&editor)),
        StatusCode::FORBIDDEN,
    )
    .await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_request_validation(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let editor = create_editor(&pool, "ed", &[]).await;

    expect(
        &app,
        json_request(
            "POST",
            "/api/deletion-requests",
            Some(&editor),
            json!({ "type": "", "resource_id": "x" }),
        ),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    expect(
        &app,
        json_request(
            "POST",
            "/api/deletion-requests",
            Some(&editor),
            json!({ "type": "course", "resource_id": "x", "details": [1, 2] }),
        ),
        StatusCode::BAD_REQUEST,
    )
    .await;
    expect(
        &app,
        json_request(
            "POST",
            "/api/deletion-requests",
            None,
            json!({ "type": "course", "resource_id": "x" }),
        ),
        StatusCode::UNAUTHORIZED,
    )
    .await;
}

async fn approve_and_expect_gone(app: &axum::Router, admin: &common::TestUser, request_id: &str) {
    let body = expect(
        app,
        empty_request(
            "POST",
            &format!("/api/deletion-requests/{}/approve", request_id),
            Some(admin),
        ),
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["status"], "approved");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_exam_uses_owning_course(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    create_course(&app, &admin, "CSE 4101", "Algorithms").await;
    create_course(&app, &admin, "CSE 4102", "Algorithms Lab").await;
    let mut exam_ids = Vec::new();
    for course in ["cse-4101", "cse-4102"] {
        let exam = expect(
            &app,
            json_request(
                "POST",
                &format!("/api/courses/{}/exams", course),
                Some(&admin),
                json!({ "title": "Final", "exam_date": "2026-12-14", "start_time": "14:00:00" }),
            ),
            StatusCode::CREATED,
        )
        .await;
        exam_ids.push(exam["id"].as_str().unwrap().to_string());
    }

    let filed = expect(
        &app,
        empty_request(
            "DELETE",
            &format!("/api/courses/cse-4101/exams/{}", exam_ids[0]),
            Some(&editor),
        ),
        StatusCode::ACCEPTED,
    )
    .await;
    assert_eq!(filed["request"]["type"], "exam");
    assert_eq!(filed["request"]["resource_id"], exam_ids[0].as_str());
    assert_eq!(filed["request"]["details"]["course_id"], "cse-4101");

    approve_and_expect_gone(&app, &admin, filed["request"]["id"].as_str().unwrap()).await;

    let (remaining,): (String,) = sqlx::query_as("SELECT course_id FROM exams")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, "cse-4102");
    assert_eq!(count_rows(&pool, "exams").await, 1);
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
    assert_eq!(audit_actions(&pool).await[0], "APPROVE_DELETION");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_schedule_entry(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[Capability::ClassCancellationEdit]).await;

    let entry = expect(
        &app,
        json_request(
            "POST",
            "/api/schedule",
            Some(&admin),
            json!({ "course_code": "CSE 4101", "day_of_week": "monday", "start_time": "09:00:00", "end_time": "10:30:00" }),
        ),
        StatusCode::CREATED,
    )
    .await;
    let entry_id = entry["id"].as_str().unwrap();

    let filed = expect(
        &app,
        empty_request("DELETE", &format!("/api/schedule/{}", entry_id), Some(&editor)),
        StatusCode::ACCEPTED,
    )
    .await;
    assert_eq!(filed["request"]["type"], "schedule");
    assert_eq!(filed["request"]["resource_id"], entry_id);
    assert_eq!(count_rows(&pool, "schedule_entries").await, 1);

    approve_and_expect_gone(&app, &admin, filed["request"]["id"].as_str().unwrap()).await;

    assert_eq!(count_rows(&pool, "schedule_entries").await, 0);
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_syllabus_by_course_code(pool: SqlitePool) {
    let app = test_app(test_state(pool.clone()));
    let admin = create_admin(&pool, "root").await;
    let editor = create_editor(&pool, "ed", &[]).await;

    for code in ["CSE4101", "CSE4102"] {
        expect(
            &app,
            json_request(
                "PUT",
                &format!("/api/syllabus/{}", code),
                Some(&admin),
                json!({ "title": "Algorithms", "content": "Week 1: sorting" }),
            ),
            StatusCode::OK,
        )
        .await;
    }

    let filed = expect(
        &app,
        empty_request("DELETE", "/api/syllabus/CSE4101", Some(&editor)),
        StatusCode::ACCEPTED,
    )
    .await;
    assert_eq!(filed["request"]["type"], "syllabus");
    assert_eq!(filed["request"]["resource_id"], "CSE4101");

    approve_and_expect_gone(&app, &admin, filed["request"]["id"].as_str().unwrap()).await;

    expect(
        &app,
        empty_request("GET", "/api/syllabus/CSE4101", None),
        StatusCode::NOT_FOUND,
    )
    .await;
    expect(
        &app,
        empty_request("GET", "/api/syllabus/CSE4102", None),
        StatusCode::OK,
    )
    .await;
    assert_eq!(count_rows(&pool, "deletion_requests").await, 0);
}
