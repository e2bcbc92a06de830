use axum::{Router, routing::get};

use crate::modules::course_files::router::init_course_files_router;
use crate::modules::exams::router::init_course_exams_router;
use crate::state::AppState;

use super::controller::{create_course, delete_course, get_course, get_courses, update_course};

pub fn init_courses_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(get_courses).post(create_course))
        .route("/{id}", get(get_course).put(update_course).delete(delete_course))
        .nest("/{id}/files", init_course_files_router(max_upload_bytes))
        .nest("/{id}/exams", init_course_exams_router())
}
