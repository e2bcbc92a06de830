use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    batch_delete_audit_logs, clear_audit_logs, delete_audit_log, get_audit_logs,
};

pub fn init_audit_logs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_audit_logs).delete(clear_audit_logs))
        .route("/batch-delete", post(batch_delete_audit_logs))
        .route("/{id}", delete(delete_audit_log))
}
