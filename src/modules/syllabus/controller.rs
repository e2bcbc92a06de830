use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireSyllabusEdit};
use crate::modules::audit_logs::AuditAction;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::deletion_requests::{
    DeletableKind, DeleteResponse, DeletionRequestService, DeletionTarget,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{SyllabusEntry, UpsertSyllabusDto};
use super::service::SyllabusService;

/// All syllabi
#[utoipa::path(
    get,
    path = "/api/syllabus",
    responses((status = 200, description = "Syllabi ordered by course code", body = Vec<SyllabusEntry>)),
    tag = "Syllabus"
)]
#[instrument(skip(state))]
pub async fn get_syllabi(
    State(state): State<AppState>,
) -> Result<Json<Vec<SyllabusEntry>>, AppError> {
    let entries = SyllabusService::list_entries(&state.db).await?;
    Ok(Json(entries))
}

/// Syllabus for one course code
#[utoipa::path(
    get,
    path = "/api/syllabus/{code}",
    params(("code" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Syllabus", body = SyllabusEntry),
        (status = 404, description = "No syllabus for the code", body = ErrorResponse)
    ),
    tag = "Syllabus"
)]
#[instrument(skip(state))]
pub async fn get_syllabus(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SyllabusEntry>, AppError> {
    let entry = SyllabusService::get_entry(&state.db, &code).await?;
    Ok(Json(entry))
}

/// Create or replace a syllabus
#[utoipa::path(
    put,
    path = "/api/syllabus/{code}",
    params(("code" = String, Path, description = "Course code")),
    request_body = UpsertSyllabusDto,
    responses(
        (status = 200, description = "Syllabus saved", body = SyllabusEntry),
        (status = 403, description = "Missing syllabus_edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Syllabus"
)]
#[instrument(skip(state, dto))]
pub async fn upsert_syllabus(
    State(state): State<AppState>,
    RequireSyllabusEdit(user): RequireSyllabusEdit,
    Path(code): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpsertSyllabusDto>,
) -> Result<Json<SyllabusEntry>, AppError> {
    let entry = SyllabusService::upsert_entry(&state.db, &code, dto, user.username()).await?;

    state
        .audit
        .record(
            AuditAction::UpdateSyllabus,
            user.username(),
            format!("Saved syllabus for {}", entry.course_code),
        )
        .await;

    Ok(Json(entry))
}

/// Delete a syllabus, or request its deletion
#[utoipa::path(
    delete,
    path = "/api/syllabus/{code}",
    params(("code" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Syllabus deleted", body = DeleteResponse),
        (status = 202, description = "Deletion request created", body = DeleteResponse),
        (status = 404, description = "No syllabus for the code", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Syllabus"
)]
#[instrument(skip(state, user))]
pub async fn delete_syllabus(
    State(state): State<AppState>,
    user: AuthUser,
    Path(code): Path<String>,
) -> Result<DeleteResponse, AppError> {
    DeletionRequestService::delete_or_request(
        &state,
        &user,
        DeletableKind::Syllabus,
        DeletionTarget::new(code),
    )
    .await
}
