//! Route table for the auth endpoints.

use axum::routing::{get, post, put};
use axum::Router;

use super::super::AppState;
use super::handlers::{
    forgot_password, google_login, login, logout, me, reset_password, signup, update_password,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/google", post(google_login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/update-password", put(update_password))
}
