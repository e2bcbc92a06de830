use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireExamsEdit};
use crate::modules::audit_logs::AuditAction;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::deletion_requests::{
    DeletableKind, DeleteResponse, DeletionRequestService, DeletionTarget,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{CreateExamDto, Exam, UpdateExamDto};
use super::service::ExamService;

/// Exam schedule across all courses
#[utoipa::path(
    get,
    path = "/api/exams",
    responses((status = 200, description = "Exams, soonest first", body = Vec<Exam>)),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn get_exams(State(state): State<AppState>) -> Result<Json<Vec<Exam>>, AppError> {
    let exams = ExamService::list_exams(&state.db).await?;
    Ok(Json(exams))
}

/// Exams for one course
#[utoipa::path(
    get,
    path = "/api/courses/{id}/exams",
    params(("id" = String, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course exams", body = Vec<Exam>),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Exams"
)]
#[instrument(skip(state))]
pub async fn get_course_exams(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<Exam>>, AppError> {
    let exams = ExamService::list_course_exams(&state.db, &course_id).await?;
    Ok(Json(exams))
}

/// Schedule an exam
#[utoipa::path(
    post,
    path = "/api/courses/{id}/exams",
    params(("id" = String, Path, description = "Course ID")),
    request_body = CreateExamDto,
    responses(
        (status = 201, description = "Exam created", body = Exam),
        (status = 403, description = "Missing exams_edit", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn create_exam(
    State(state): State<AppState>,
    RequireExamsEdit(user): RequireExamsEdit,
    Path(course_id): Path<String>,
    ValidatedJson(dto): ValidatedJson<CreateExamDto>,
) -> Result<(StatusCode, Json<Exam>), AppError> {
    let exam = ExamService::create_exam(&state.db, &course_id, dto).await?;

    state
        .audit
        .record(
            AuditAction::CreateExam,
            user.username(),
            format!("Scheduled {} for course {} on {}", exam.title, course_id, exam.exam_date),
        )
        .await;

    Ok((StatusCode::CREATED, Json(exam)))
}

/// Update an exam
#[utoipa::path(
    put,
    path = "/api/courses/{id}/exams/{exam_id}",
    params(
        ("id" = String, Path, description = "Course ID"),
        ("exam_id" = String, Path, description = "Exam ID")
    ),
    request_body = UpdateExamDto,
    responses(
        (status = 200, description = "Exam updated", body = Exam),
        (status = 403, description = "Missing exams_edit", body = ErrorResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, dto))]
pub async fn update_exam(
    State(state): State<AppState>,
    RequireExamsEdit(user): RequireExamsEdit,
    Path((course_id, exam_id)): Path<(String, String)>,
    ValidatedJson(dto): ValidatedJson<UpdateExamDto>,
) -> Result<Json<Exam>, AppError> {
    let exam = ExamService::update_exam(&state.db, &course_id, &exam_id, dto).await?;

    state
        .audit
        .record(
            AuditAction::UpdateExam,
            user.username(),
            format!("Updated exam {} for course {}", exam.title, course_id),
        )
        .await;

    Ok(Json(exam))
}

/// Delete an exam, or request its deletion
#[utoipa::path(
    delete,
    path = "/api/courses/{id}/exams/{exam_id}",
    params(
        ("id" = String, Path, description = "Course ID"),
        ("exam_id" = String, Path, description = "Exam ID")
    ),
    responses(
        (status = 200, description = "Exam deleted", body = DeleteResponse),
        (status = 202, description = "Deletion request created", body = DeleteResponse),
        (status = 404, description = "Exam not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Exams"
)]
#[instrument(skip(state, user))]
pub async fn delete_exam(
    State(state): State<AppState>,
    user: AuthUser,
    Path((course_id, exam_id)): Path<(String, String)>,
) -> Result<DeleteResponse, AppError> {
    DeletionRequestService::delete_or_request(
        &state,
        &user,
        DeletableKind::Exam,
        DeletionTarget::in_course(course_id, exam_id),
    )
    .await
}
