//! Route table for the admin endpoints.

use axum::routing::{get, patch};
use axum::Router;

use super::super::AppState;
use super::handlers::{list_users, update_role, update_status};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/role", patch(update_role))
        .route("/users/:id/status", patch(update_status))
}
