use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::RequireScheduleEdit;
use crate::modules::audit_logs::AuditAction;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::MessageResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{CreateHolidayDto, Holiday, UpdateHolidayDto};
use super::service::HolidayService;

/// Academic holidays
#[utoipa::path(
    get,
    path = "/api/holidays",
    responses((status = 200, description = "Holidays ordered by start date", body = Vec<Holiday>)),
    tag = "Holidays"
)]
#[instrument(skip(state))]
pub async fn get_holidays(State(state): State<AppState>) -> Result<Json<Vec<Holiday>>, AppError> {
    let holidays = HolidayService::list_holidays(&state.db).await?;
    Ok(Json(holidays))
}

/// Add a holiday
#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = CreateHolidayDto,
    responses(
        (status = 201, description = "Holiday created", body = Holiday),
        (status = 400, description = "end_date before start_date", body = ErrorResponse),
        (status = 403, description = "Missing schedule_edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
#[instrument(skip(state, dto))]
pub async fn create_holiday(
    State(state): State<AppState>,
    RequireScheduleEdit(user): RequireScheduleEdit,
    ValidatedJson(dto): ValidatedJson<CreateHolidayDto>,
) -> Result<(StatusCode, Json<Holiday>), AppError> {
    let holiday = HolidayService::create_holiday(&state.db, dto).await?;

    state
        .audit
        .record(
            AuditAction::CreateHoliday,
            user.username(),
            format!(
                "Added holiday {} ({} to {})",
                holiday.title, holiday.start_date, holiday.end_date
            ),
        )
        .await;

    Ok((StatusCode::CREATED, Json(holiday)))
}

/// Update a holiday
#[utoipa::path(
    put,
    path = "/api/holidays/{id}",
    params(("id" = String, Path, description = "Holiday ID")),
    request_body = UpdateHolidayDto,
    responses(
        (status = 200, description = "Holiday updated", body = Holiday),
        (status = 403, description = "Missing schedule_edit", body = ErrorResponse),
        (status = 404, description = "Holiday not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
#[instrument(skip(state, dto))]
pub async fn update_holiday(
    State(state): State<AppState>,
    RequireScheduleEdit(user): RequireScheduleEdit,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateHolidayDto>,
) -> Result<Json<Holiday>, AppError> {
    let holiday = HolidayService::update_holiday(&state.db, &id, dto).await?;

    state
        .audit
        .record(
            AuditAction::UpdateHoliday,
            user.username(),
            format!("Updated holiday {}", holiday.title),
        )
        .await;

    Ok(Json(holiday))
}

/// Delete a holiday
///
/// Holidays are not part of the deletion-request workflow; the capability is required.
#[utoipa::path(
    delete,
    path = "/api/holidays/{id}",
    params(("id" = String, Path, description = "Holiday ID")),
    responses(
        (status = 200, description = "Holiday deleted", body = MessageResponse),
        (status = 403, description = "Missing schedule_edit", body = ErrorResponse),
        (status = 404, description = "Holiday not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
#[instrument(skip(state))]
pub async fn delete_holiday(
    State(state): State<AppState>,
    RequireScheduleEdit(user): RequireScheduleEdit,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let holiday = HolidayService::delete_holiday(&state.db, &id).await?;

    state
        .audit
        .record(
            AuditAction::DeleteHoliday,
            user.username(),
            format!("Deleted holiday {}", holiday.title),
        )
        .await;

    Ok(Json(MessageResponse {
        message: "Holiday deleted".to_string(),
    }))
}
