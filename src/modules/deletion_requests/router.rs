use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    approve_deletion_request, create_deletion_request, get_deletion_requests,
    reject_deletion_request,
};

pub fn init_deletion_requests_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_deletion_requests).post(create_deletion_request))
        .route("/{id}/approve", post(approve_deletion_request))
        .route("/{id}/reject", post(reject_deletion_request))
}
