use axum::{
    Extension, Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{delete_feedback, get_feedback, submit_feedback};
use super::model::FeedbackKind;

/// Router for one feedback kind, mounted at `/{kind.route_segment()}`.
pub fn init_feedback_router(kind: FeedbackKind) -> Router<AppState> {
    Router::new()
        .route("/", get(get_feedback).post(submit_feedback))
        .route("/{id}", delete(delete_feedback))
        .layer(Extension(kind))
}
