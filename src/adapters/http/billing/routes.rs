//! Route table for the billing endpoints.
//!
//! The webhook route is mounted separately at /stripe/webhook by the
//! top-level router; it authenticates by signature, not by session.

use axum::routing::{get, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{billing_portal, confirm_checkout, create_checkout, list_plans};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(create_checkout).get(confirm_checkout))
        .route("/billing-portal", post(billing_portal))
        .route("/plans", get(list_plans))
}
