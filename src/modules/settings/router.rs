use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{get_settings, update_breaking_news, update_welcome_message};

pub fn init_settings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings))
        .route("/welcome-message", put(update_welcome_message))
        .route("/breaking-news", put(update_breaking_news))
}
