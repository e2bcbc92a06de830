use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    attach_notice_document, create_notice, delete_notice, get_notice, get_notices, update_notice,
};

pub fn init_notices_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(get_notices).post(create_notice))
        .route("/{id}", get(get_notice).put(update_notice).delete(delete_notice))
        .route(
            "/{id}/document",
            put(attach_notice_document).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
