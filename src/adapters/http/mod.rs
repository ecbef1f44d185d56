//! HTTP adapter: the REST surface of the API.
//!
//! One top-level router composed of per-area route tables, all sharing a
//! single [`AppState`] of Arc'd ports. The auth middleware runs on every
//! route and defers rejection to the guard extractors.

pub mod admin;
pub mod auth;
pub mod billing;
mod cookies;
pub mod envelope;
mod error;
pub mod middleware;
pub mod notes;

pub use cookies::CookieSettings;
pub use error::{expose_error_details, ApiError, ApiJson};
pub use middleware::{CurrentAccount, OptionalAuth, RequireAdmin, RequireAuth};

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::domain::billing::{StripeWebhookVerifier, SubscriptionReconciler};
use crate::ports::{
    AccountRepository, BillingProvider, IdentityVerifier, Mailer, NoteRepository, PasswordHasher,
    PriceCatalog, ResetTokenRepository, TokenCodec,
};

/// Everything the handlers need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub reset_tokens: Arc<dyn ResetTokenRepository>,
    pub prices: Arc<dyn PriceCatalog>,
    pub billing: Arc<dyn BillingProvider>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub mailer: Arc<dyn Mailer>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_codec: Arc<dyn TokenCodec>,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    pub reconciler: Arc<SubscriptionReconciler>,
    pub cookies: CookieSettings,
    /// Customer-app origin, used for reset links and checkout redirects.
    pub app_base_url: String,
}

/// GET /health - liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(envelope::success(json!({ "status": "ok" })))
}

/// Catch-all so unknown paths answer in the envelope, not bare 404 text.
async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(envelope::error("NOT_FOUND", "Resource not found", None)),
    )
        .into_response()
}

/// Builds the full API router over the given state.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth::routes())
        .nest("/admin", admin::routes())
        .nest("/billing", billing::routes())
        .route("/stripe/webhook", post(billing::stripe_webhook))
        .nest("/notes", notes::routes())
        .route("/health", get(health))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
