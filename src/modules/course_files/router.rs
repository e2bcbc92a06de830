use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{delete_course_file, get_course_files, upload_course_file};

/// Mounted under `/courses/{id}/files`. Uploads may be up to `max_upload_bytes`.
pub fn init_course_files_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(get_course_files)
                .post(upload_course_file)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/{file_id}", delete(delete_course_file))
}
