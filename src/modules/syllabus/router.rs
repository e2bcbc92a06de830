use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{delete_syllabus, get_syllabi, get_syllabus, upsert_syllabus};

pub fn init_syllabus_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_syllabi))
        .route(
            "/{code}",
            get(get_syllabus).put(upsert_syllabus).delete(delete_syllabus),
        )
}
