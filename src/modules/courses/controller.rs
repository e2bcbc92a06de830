use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireCoursesEdit};
use crate::modules::audit_logs::AuditAction;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::deletion_requests::{
    DeletableKind, DeleteResponse, DeletionRequestService, DeletionTarget,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{Course, CreateCourseDto, UpdateCourseDto};
use super::service::CourseService;

/// List courses
#[utoipa::path(
    get,
    path = "/api/courses",
    responses((status = 200, description = "All courses ordered by code", body = Vec<Course>)),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = CourseService::list_courses(&state.db).await?;
    Ok(Json(courses))
}

/// Get a course
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course ID (slug of the code)")),
    responses(
        (status = 200, description = "Course", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::get_course(&state.db, &id).await?;
    Ok(Json(course))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Course already exists", body = ErrorResponse),
        (status = 403, description = "Missing courses_edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    RequireCoursesEdit(user): RequireCoursesEdit,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = CourseService::create_course(&state.db, dto).await?;

    state
        .audit
        .record(
            AuditAction::CreateCourse,
            user.username(),
            format!("Created course {} ({})", course.code, course.title),
        )
        .await;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 403, description = "Missing courses_edit", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn update_course(
    State(state): State<AppState>,
    RequireCoursesEdit(user): RequireCoursesEdit,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::update_course(&state.db, &id, dto).await?;

    state
        .audit
        .record(
            AuditAction::UpdateCourse,
            user.username(),
            format!("Updated course {}", course.code),
        )
        .await;

    Ok(Json(course))
}

/// Delete a course, or request its deletion
///
/// Callers without `courses_edit` get a pending deletion request (202).
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course, files and exams deleted", body = DeleteResponse),
        (status = 202, description = "Deletion request created", body = DeleteResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, user))]
pub async fn delete_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, AppError> {
    DeletionRequestService::delete_or_request(
        &state,
        &user,
        DeletableKind::Course,
        DeletionTarget::new(id),
    )
    .await
}
