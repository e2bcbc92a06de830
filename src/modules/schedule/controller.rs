use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireClassCancellationEdit, RequireScheduleEdit};
use crate::modules::audit_logs::AuditAction;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::deletion_requests::{
    DeletableKind, DeleteResponse, DeletionRequestService, DeletionTarget,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    CreateScheduleEntryDto, ScheduleEntry, SetCancellationDto, UpdateScheduleEntryDto,
};
use super::service::ScheduleService;

/// Weekly class timetable
#[utoipa::path(
    get,
    path = "/api/schedule",
    responses((status = 200, description = "Entries ordered by weekday and start time", body = Vec<ScheduleEntry>)),
    tag = "Schedule"
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScheduleEntry>>, AppError> {
    let entries = ScheduleService::list_entries(&state.db).await?;
    Ok(Json(entries))
}

/// Add a class slot
#[utoipa::path(
    post,
    path = "/api/schedule",
    request_body = CreateScheduleEntryDto,
    responses(
        (status = 201, description = "Entry created", body = ScheduleEntry),
        (status = 400, description = "end_time before start_time", body = ErrorResponse),
        (status = 403, description = "Missing schedule_edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
#[instrument(skip(state, dto))]
pub async fn create_schedule_entry(
    State(state): State<AppState>,
    RequireScheduleEdit(user): RequireScheduleEdit,
    ValidatedJson(dto): ValidatedJson<CreateScheduleEntryDto>,
) -> Result<(StatusCode, Json<ScheduleEntry>), AppError> {
    let entry = ScheduleService::create_entry(&state.db, dto).await?;

    state
        .audit
        .record(
            AuditAction::CreateSchedule,
            user.username(),
            format!(
                "Added {} on {} at {}",
                entry.course_code, entry.day_of_week, entry.start_time
            ),
        )
        .await;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Update a class slot
#[utoipa::path(
    put,
    path = "/api/schedule/{id}",
    params(("id" = String, Path, description = "Schedule entry ID")),
    request_body = UpdateScheduleEntryDto,
    responses(
        (status = 200, description = "Entry updated", body = ScheduleEntry),
        (status = 403, description = "Missing schedule_edit", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
#[instrument(skip(state, dto))]
pub async fn update_schedule_entry(
    State(state): State<AppState>,
    RequireScheduleEdit(user): RequireScheduleEdit,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateScheduleEntryDto>,
) -> Result<Json<ScheduleEntry>, AppError> {
    let entry = ScheduleService::update_entry(&state.db, &id, dto).await?;

    state
        .audit
        .record(
            AuditAction::UpdateSchedule,
            user.username(),
            format!("Updated {} on {}", entry.course_code, entry.day_of_week),
        )
        .await;

    Ok(Json(entry))
}

/// Cancel or restore a class
#[utoipa::path(
    put,
    path = "/api/schedule/{id}/cancellation",
    params(("id" = String, Path, description = "Schedule entry ID")),
    request_body = SetCancellationDto,
    responses(
        (status = 200, description = "Cancellation state updated", body = ScheduleEntry),
        (status = 403, description = "Missing class_cancellation_edit", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
#[instrument(skip(state, dto))]
pub async fn set_class_cancellation(
    State(state): State<AppState>,
    RequireClassCancellationEdit(user): RequireClassCancellationEdit,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<SetCancellationDto>,
) -> Result<Json<ScheduleEntry>, AppError> {
    let entry = ScheduleService::set_cancellation(&state.db, &id, dto).await?;

    let (action, verb) = if entry.is_cancelled {
        (AuditAction::CancelClass, "Cancelled")
    } else {
        (AuditAction::RestoreClass, "Restored")
    };
    state
        .audit
        .record(
            action,
            user.username(),
            format!(
                "{} {} on {} at {}",
                verb, entry.course_code, entry.day_of_week, entry.start_time
            ),
        )
        .await;

    Ok(Json(entry))
}

/// Delete a class slot, or request its deletion
#[utoipa::path(
    delete,
    path = "/api/schedule/{id}",
    params(("id" = String, Path, description = "Schedule entry ID")),
    responses(
        (status = 200, description = "Entry deleted", body = DeleteResponse),
        (status = 202, description = "Deletion request created", body = DeleteResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
#[instrument(skip(state, user))]
pub async fn delete_schedule_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, AppError> {
    DeletionRequestService::delete_or_request(
        &state,
        &user,
        DeletableKind::Schedule,
        DeletionTarget::new(id),
    )
    .await
}
