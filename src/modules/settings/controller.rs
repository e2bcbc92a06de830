use axum::{Json, extract::State};
use tracing::instrument;

use coursehub_core::AppError;

use crate::middleware::auth::{AuthUser, RequireBreakingNewsEdit, RequireWelcomeMessageEdit};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{PortalSettings, SettingKey, UpdateSettingDto};
use super::service::SettingsService;

/// Welcome message and breaking news
#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Portal settings", body = PortalSettings)),
    tag = "Settings"
)]
#[instrument(skip(state))]
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<PortalSettings>, AppError> {
    let settings = SettingsService::get_settings(&state.db).await?;
    Ok(Json(settings))
}

async fn update_setting(
    state: &AppState,
    user: &AuthUser,
    key: SettingKey,
    value: &str,
) -> Result<Json<PortalSettings>, AppError> {
    let settings = SettingsService::set(&state.db, key, value, user.username()).await?;

    let summary = if value.is_empty() {
        format!("Cleared {}", key.as_str())
    } else {
        format!("Set {} ({} characters)", key.as_str(), value.chars().count())
    };
    state
        .audit
        .record(key.update_action(), user.username(), summary)
        .await;

    Ok(Json(settings))
}

/// Replace the welcome message
#[utoipa::path(
    put,
    path = "/api/settings/welcome-message",
    request_body = UpdateSettingDto,
    responses(
        (status = 200, description = "Settings after the update", body = PortalSettings),
        (status = 403, description = "Missing welcome_message_edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
#[instrument(skip(state, dto))]
pub async fn update_welcome_message(
    State(state): State<AppState>,
    RequireWelcomeMessageEdit(user): RequireWelcomeMessageEdit,
    ValidatedJson(dto): ValidatedJson<UpdateSettingDto>,
) -> Result<Json<PortalSettings>, AppError> {
    update_setting(&state, &user, SettingKey::WelcomeMessage, &dto.value).await
}

/// Replace the breaking news banner
#[utoipa::path(
    put,
    path = "/api/settings/breaking-news",
    request_body = UpdateSettingDto,
    responses(
        (status = 200, description = "Settings after the update", body = PortalSettings),
        (status = 403, description = "Missing breaking_news_edit", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
#[instrument(skip(state, dto))]
pub async fn update_breaking_news(
    State(state): State<AppState>,
    RequireBreakingNewsEdit(user): RequireBreakingNewsEdit,
    ValidatedJson(dto): ValidatedJson<UpdateSettingDto>,
) -> Result<Json<PortalSettings>, AppError> {
    update_setting(&state, &user, SettingKey::BreakingNews, &dto.value).await
}
