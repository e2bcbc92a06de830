use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireNoticesEdit};
use crate::modules::audit_logs::AuditAction;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::deletion_requests::{
    DeletableKind, DeleteResponse, DeletionRequestService, DeletionTarget,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{CreateNoticeDto, DocumentQuery, Notice, UpdateNoticeDto};
use super::service::NoticeService;

/// Notice board, newest first
#[utoipa::path(
    get,
    path = "/api/notices",
    responses((status = 200, description = "Notices", body = Vec<Notice>)),
    tag = "Notices"
)]
#[instrument(skip(state))]
pub async fn get_notices(State(state): State<AppState>) -> Result<Json<Vec<Notice>>, AppError> {
    let notices = NoticeService::list_notices(&state.db, state.storage.as_ref()).await?;
    Ok(Json(notices))
}

/// Get a notice
#[utoipa::path(
    get,
    path = "/api/notices/{id}",
    params(("id" = String, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice", body = Notice),
        (status = 404, description = "Notice not found", body = ErrorResponse)
    ),
    tag = "Notices"
)]
#[instrument(skip(state))]
pub async fn get_notice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notice>, AppError> {
    let notice = NoticeService::get_notice(&state.db, state.storage.as_ref(), &id).await?;
    Ok(Json(notice))
}

/// Post a notice
#[utoipa::path(
    post,
    path = "/api/notices",
    request_body = CreateNoticeDto,
    responses(
        (status = 201, description = "Notice created", body = Notice),
        (status = 403, description = "Missing notices_edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, dto))]
pub async fn create_notice(
    State(state): State<AppState>,
    RequireNoticesEdit(user): RequireNoticesEdit,
    ValidatedJson(dto): ValidatedJson<CreateNoticeDto>,
) -> Result<(StatusCode, Json<Notice>), AppError> {
    let notice = NoticeService::create_notice(&state.db, dto, user.username()).await?;

    state
        .audit
        .record(
            AuditAction::CreateNotice,
            user.username(),
            format!("Posted notice \"{}\"", notice.title),
        )
        .await;

    Ok((StatusCode::CREATED, Json(notice)))
}

/// Edit a notice
#[utoipa::path(
    put,
    path = "/api/notices/{id}",
    params(("id" = String, Path, description = "Notice ID")),
    request_body = UpdateNoticeDto,
    responses(
        (status = 200, description = "Notice updated", body = Notice),
        (status = 403, description = "Missing notices_edit", body = ErrorResponse),
        (status = 404, description = "Notice not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, dto))]
pub async fn update_notice(
    State(state): State<AppState>,
    RequireNoticesEdit(user): RequireNoticesEdit,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateNoticeDto>,
) -> Result<Json<Notice>, AppError> {
    let notice = NoticeService::update_notice(&state.db, state.storage.as_ref(), &id, dto).await?;

    state
        .audit
        .record(
            AuditAction::UpdateNotice,
            user.username(),
            format!("Updated notice \"{}\"", notice.title),
        )
        .await;

    Ok(Json(notice))
}

/// Attach a document to a notice
///
/// The request body is the raw document content.
#[utoipa::path(
    put,
    path = "/api/notices/{id}/document",
    params(("id" = String, Path, description = "Notice ID"), DocumentQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Document attached", body = Notice),
        (status = 403, description = "Missing notices_edit", body = ErrorResponse),
        (status = 404, description = "Notice not found", body = ErrorResponse),
        (status = 413, description = "Document too large", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, body), fields(body.len = body.len()))]
pub async fn attach_notice_document(
    State(state): State<AppState>,
    RequireNoticesEdit(user): RequireNoticesEdit,
    Path(id): Path<String>,
    Query(query): Query<DocumentQuery>,
    body: Bytes,
) -> Result<Json<Notice>, AppError> {
    let notice =
        NoticeService::attach_document(&state.db, state.storage.as_ref(), &id, &query.name, &body)
            .await?;

    state
        .audit
        .record(
            AuditAction::AttachNoticeDocument,
            user.username(),
            format!(
                "Attached {} to notice \"{}\"",
                notice.document_name.as_deref().unwrap_or_default(),
                notice.title
            ),
        )
        .await;

    Ok(Json(notice))
}

/// Delete a notice, or request its deletion
#[utoipa::path(
    delete,
    path = "/api/notices/{id}",
    params(("id" = String, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice deleted", body = DeleteResponse),
        (status = 202, description = "Deletion request created", body = DeleteResponse),
        (status = 404, description = "Notice not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notices"
)]
#[instrument(skip(state, user))]
pub async fn delete_notice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<DeleteResponse, AppError> {
    DeletionRequestService::delete_or_request(
        &state,
        &user,
        DeletableKind::Notice,
        DeletionTarget::new(id),
    )
    .await
}
