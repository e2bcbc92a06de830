use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{
    create_schedule_entry, delete_schedule_entry, get_schedule, set_class_cancellation,
    update_schedule_entry,
};

pub fn init_schedule_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_schedule).post(create_schedule_entry))
        .route("/{id}", put(update_schedule_entry).delete(delete_schedule_entry))
        .route("/{id}/cancellation", put(set_class_cancellation))
}
