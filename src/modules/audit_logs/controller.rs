use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::RequireAdmin;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::MessageResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{AuditAction, AuditLogEntry, BatchDeleteAuditLogsDto, DeletedCountResponse};
use super::service::AuditLogService;

/// List audit log entries, newest first
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    responses(
        (status = 200, description = "Audit log, newest first", body = Vec<AuditLogEntry>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Audit Logs"
)]
#[instrument(skip(state))]
pub async fn get_audit_logs(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<AuditLogEntry>>, AppError> {
    let entries = AuditLogService::list(&state.db).await?;
    Ok(Json(entries))
}

/// Delete one audit log entry
#[utoipa::path(
    delete,
    path = "/api/audit-logs/{id}",
    params(("id" = String, Path, description = "Audit log entry ID")),
    responses(
        (status = 200, description = "Entry deleted", body = MessageResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Audit Logs"
)]
#[instrument(skip(state))]
pub async fn delete_audit_log(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    AuditLogService::delete_one(&state.db, &id).await?;
    Ok(Json(MessageResponse {
        message: "Audit log entry deleted".to_string(),
    }))
}

/// Delete several audit log entries
#[utoipa::path(
    post,
    path = "/api/audit-logs/batch-delete",
    request_body = BatchDeleteAuditLogsDto,
    responses(
        (status = 200, description = "Number of entries removed", body = DeletedCountResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Audit Logs"
)]
#[instrument(skip(state, dto))]
pub async fn batch_delete_audit_logs(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    ValidatedJson(dto): ValidatedJson<BatchDeleteAuditLogsDto>,
) -> Result<Json<DeletedCountResponse>, AppError> {
    let deleted = AuditLogService::delete_many(&state.db, &dto.ids).await?;
    Ok(Json(DeletedCountResponse { deleted }))
}

/// Clear the audit log
///
/// Leaves a single `CLEAR_AUDIT_LOGS` entry behind.
#[utoipa::path(
    delete,
    path = "/api/audit-logs",
    responses(
        (status = 200, description = "Number of entries removed", body = DeletedCountResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Audit Logs"
)]
#[instrument(skip(state))]
pub async fn clear_audit_logs(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<DeletedCountResponse>, AppError> {
    let deleted = AuditLogService::clear(&state.db).await?;

    state
        .audit
        .record(
            AuditAction::ClearAuditLogs,
            admin.username(),
            format!("Cleared {} audit log entries", deleted),
        )
        .await;

    Ok(Json(DeletedCountResponse { deleted }))
}
