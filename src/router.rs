use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::rate_limit::{KeyedRateLimiter, rate_limit_middleware};
use crate::modules::audit_logs::router::init_audit_logs_router;
use crate::modules::auth::router::init_auth_router;
use crate::modules::courses::router::init_courses_router;
use crate::modules::deletion_requests::router::init_deletion_requests_router;
use crate::modules::exams::router::init_exams_router;
use crate::modules::feedback::FeedbackKind;
use crate::modules::feedback::router::init_feedback_router;
use crate::modules::holidays::router::init_holidays_router;
use crate::modules::notices::router::init_notices_router;
use crate::modules::schedule::router::init_schedule_router;
use crate::modules::settings::router::init_settings_router;
use crate::modules::syllabus::router::init_syllabus_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

fn auth_router(state: &AppState) -> Router<AppState> {
    match state.rate_limit_config.auth_quota() {
        Some(quota) => init_auth_router().route_layer(middleware::from_fn_with_state(
            KeyedRateLimiter::new(quota),
            rate_limit_middleware,
        )),
        None => init_auth_router(),
    }
}

fn api_router(state: &AppState) -> Router<AppState> {
    let max_upload_bytes = state.storage_config.max_upload_bytes;

    let mut api = Router::new()
        .nest("/auth", auth_router(state))
        .nest("/users", init_users_router())
        .nest("/courses", init_courses_router(max_upload_bytes))
        .nest("/exams", init_exams_router())
        .nest("/schedule", init_schedule_router())
        .nest("/syllabus", init_syllabus_router())
        .nest("/notices", init_notices_router(max_upload_bytes))
        .nest("/holidays", init_holidays_router())
        .nest("/settings", init_settings_router())
        .nest("/deletion-requests", init_deletion_requests_router())
        .nest("/audit-logs", init_audit_logs_router());

    for kind in FeedbackKind::ALL {
        api = api.nest(&format!("/{}", kind.route_segment()), init_feedback_router(kind));
    }

    api
}

pub fn init_router(state: AppState) -> Router {
    let cors = {
        let allowed_origins: Vec<HeaderValue> = state
            .cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_credentials(true)
    };

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api_router(&state))
        .nest_service("/files", ServeDir::new(&state.storage_config.upload_dir))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
