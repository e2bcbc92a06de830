use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    change_password, create_user, delete_user, get_profile, get_users, update_profile,
    update_user,
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/change-password", post(change_password))
        .route("/{id}", put(update_user).delete(delete_user))
}
