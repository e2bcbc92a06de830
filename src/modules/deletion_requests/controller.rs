use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireAdmin};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    ApprovalResponse, CreateDeletionRequestDto, DeletionRequest, RejectionResponse,
};
use super::service::DeletionRequestService;

/// Pending deletion requests, oldest first
#[utoipa::path(
    get,
    path = "/api/deletion-requests",
    responses(
        (status = 200, description = "Pending requests", body = Vec<DeletionRequest>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Deletion Requests"
)]
#[instrument(skip(state))]
pub async fn get_deletion_requests(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<DeletionRequest>>, AppError> {
    let requests = DeletionRequestService::list_pending(&state.db).await?;
    Ok(Json(requests))
}

/// File a deletion request
///
/// `requested_by` is always the authenticated user.
#[utoipa::path(
    post,
    path = "/api/deletion-requests",
    request_body = CreateDeletionRequestDto,
    responses(
        (status = 201, description = "Request filed", body = DeletionRequest),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "type or resource_id missing", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Deletion Requests"
)]
#[instrument(skip(state, user, dto))]
pub async fn create_deletion_request(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateDeletionRequestDto>,
) -> Result<(StatusCode, Json<DeletionRequest>), AppError> {
    let request = DeletionRequestService::submit(
        &state.db,
        &dto.kind,
        &dto.resource_id,
        dto.details,
        user.username(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// Approve a deletion request and delete the resource
#[utoipa::path(
    post,
    path = "/api/deletion-requests/{id}/approve",
    params(("id" = String, Path, description = "Deletion request ID")),
    responses(
        (status = 200, description = "Resource deleted, request removed", body = ApprovalResponse),
        (status = 400, description = "Unknown type or missing course_id; request stays pending", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Request or resource not found", body = ErrorResponse),
        (status = 409, description = "Request already being processed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Deletion Requests"
)]
#[instrument(skip(state))]
pub async fn approve_deletion_request(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<ApprovalResponse>, AppError> {
    let approval = DeletionRequestService::approve(&state, &id, admin.username()).await?;

    Ok(Json(ApprovalResponse {
        status: "approved".to_string(),
        kind: approval.kind,
        resource_id: approval.request.resource_id,
        summary: approval.summary,
    }))
}

/// Reject a deletion request
#[utoipa::path(
    post,
    path = "/api/deletion-requests/{id}/reject",
    params(("id" = String, Path, description = "Deletion request ID")),
    responses(
        (status = 200, description = "Request removed, resource untouched", body = RejectionResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request already being processed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Deletion Requests"
)]
#[instrument(skip(state))]
pub async fn reject_deletion_request(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<RejectionResponse>, AppError> {
    let request = DeletionRequestService::reject(&state, &id, admin.username()).await?;

    Ok(Json(RejectionResponse {
        status: "rejected".to_string(),
        request,
    }))
}
