use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{create_exam, delete_exam, get_course_exams, get_exams, update_exam};

pub fn init_exams_router() -> Router<AppState> {
    Router::new().route("/", get(get_exams))
}

/// Mounted under `/courses/{id}/exams`.
pub fn init_course_exams_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_course_exams).post(create_exam))
        .route("/{exam_id}", put(update_exam).delete(delete_exam))
}
