use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::modules::audit_logs::service::ANONYMOUS_ACTOR;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::MessageResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{Feedback, FeedbackKind, SubmitFeedbackDto};
use super::service::FeedbackService;

/// Submit a message, complaint or opinion
///
/// Public; no account needed.
#[utoipa::path(
    post,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "messages, complaints or opinions")),
    request_body = SubmitFeedbackDto,
    responses(
        (status = 201, description = "Submission stored", body = Feedback),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Feedback"
)]
#[instrument(skip(state, dto))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Extension(kind): Extension<FeedbackKind>,
    ValidatedJson(dto): ValidatedJson<SubmitFeedbackDto>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    let feedback = FeedbackService::submit(&state.db, kind, dto).await?;

    state
        .audit
        .record(
            kind.submit_action(),
            ANONYMOUS_ACTOR,
            format!(
                "New {} from {}",
                kind,
                feedback.name.as_deref().unwrap_or("anonymous")
            ),
        )
        .await;

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// List submissions of one kind, newest first
#[utoipa::path(
    get,
    path = "/api/{kind}",
    params(("kind" = String, Path, description = "messages, complaints or opinions")),
    responses(
        (status = 200, description = "Submissions", body = Vec<Feedback>),
        (status = 403, description = "Missing the matching *_view capability", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
#[instrument(skip(state, user))]
pub async fn get_feedback(
    State(state): State<AppState>,
    Extension(kind): Extension<FeedbackKind>,
    user: AuthUser,
) -> Result<Json<Vec<Feedback>>, AppError> {
    user.require(kind.view_capability())?;
    let feedback = FeedbackService::list(&state.db, kind).await?;
    Ok(Json(feedback))
}

/// Delete one submission
#[utoipa::path(
    delete,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "messages, complaints or opinions"),
        ("id" = String, Path, description = "Submission ID")
    ),
    responses(
        (status = 200, description = "Submission deleted", body = MessageResponse),
        (status = 403, description = "Missing the matching *_view capability", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
#[instrument(skip(state, user))]
pub async fn delete_feedback(
    State(state): State<AppState>,
    Extension(kind): Extension<FeedbackKind>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    user.require(kind.view_capability())?;
    let feedback = FeedbackService::delete(&state.db, kind, &id).await?;

    state
        .audit
        .record(
            kind.delete_action(),
            user.username(),
            format!(
                "Deleted {} {} from {}",
                kind,
                feedback.id,
                feedback.name.as_deref().unwrap_or("anonymous")
            ),
        )
        .await;

    Ok(Json(MessageResponse {
        message: format!("{} deleted", kind),
    }))
}
