use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireCourseMaterialsEdit};
use crate::modules::audit_logs::AuditAction;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::deletion_requests::{
    DeletableKind, DeleteResponse, DeletionRequestService, DeletionTarget,
};
use crate::state::AppState;

use super::model::{CourseFile, UploadQuery};
use super::service::CourseFileService;

/// List a course's material
#[utoipa::path(
    get,
    path = "/api/courses/{id}/files",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Files, newest first", body = Vec<CourseFile>),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Course Files"
)]
#[instrument(skip(state))]
pub async fn get_course_files(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<CourseFile>>, AppError> {
    let files = CourseFileService::list_files(&state.db, state.storage.as_ref(), &course_id).await?;
    Ok(Json(files))
}

/// Upload course material
///
/// The request body is the raw file content.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/files",
    params(("id" = String, Path, description = "Course ID"), UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored", body = CourseFile),
        (status = 400, description = "Empty upload", body = ErrorResponse),
        (status = 403, description = "Missing course_materials_edit", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Course Files"
)]
#[instrument(skip(state, body), fields(body.len = body.len()))]
pub async fn upload_course_file(
    State(state): State<AppState>,
    RequireCourseMaterialsEdit(user): RequireCourseMaterialsEdit,
    Path(course_id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<CourseFile>), AppError> {
    let file = CourseFileService::upload_file(
        &state.db,
        state.storage.as_ref(),
        &course_id,
        &query.name,
        &body,
        user.username(),
    )
    .await?;

    state
        .audit
        .record(
            AuditAction::UploadFile,
            user.username(),
            format!("Uploaded {} to course {}", file.name, course_id),
        )
        .await;

    Ok((StatusCode::CREATED, Json(file)))
}

/// Delete course material, or request its deletion
#[utoipa::path(
    delete,
    path = "/api/courses/{id}/files/{file_id}",
    params(
        ("id" = String, Path, description = "Course ID"),
        ("file_id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 202, description = "Deletion request created", body = DeleteResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Course Files"
)]
#[instrument(skip(state, user))]
pub async fn delete_course_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path((course_id, file_id)): Path<(String, String)>,
) -> Result<DeleteResponse, AppError> {
    DeletionRequestService::delete_or_request(
        &state,
        &user,
        DeletableKind::File,
        DeletionTarget::in_course(course_id, file_id),
    )
    .await
}
