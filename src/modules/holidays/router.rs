use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{create_holiday, delete_holiday, get_holidays, update_holiday};

pub fn init_holidays_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_holidays).post(create_holiday))
        .route("/{id}", put(update_holiday).delete(delete_holiday))
}
