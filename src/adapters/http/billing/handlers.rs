//! Handlers for checkout, billing portal, plans, and the webhook.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::account::{Account, AuthError};
use crate::domain::billing::ReconcileOutcome;
use crate::domain::foundation::AccountId;

use super::super::envelope;
use super::super::error::{ApiError, ApiJson};
use super::super::middleware::RequireAuth;
use super::super::AppState;
use super::dto::{
    CheckoutConfirmationDto, CheckoutRequest, CheckoutSessionDto, ConfirmCheckoutQuery, PlanDto,
    PortalSessionDto,
};

async fn load_account(state: &AppState, id: AccountId) -> Result<Account, ApiError> {
    state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AuthError::AccountNotFound.into())
}

/// Returns the account's billing-customer id, creating the upstream
/// customer on first use.
///
/// Check-then-set: a concurrent first checkout can create a second
/// upstream customer, but only the first persisted id is kept (the store
/// keeps the earliest write), so the account never flips between
/// customers.
async fn ensure_billing_customer(state: &AppState, account: &Account) -> Result<String, ApiError> {
    if let Some(customer_id) = &account.stripe_customer_id {
        return Ok(customer_id.clone());
    }

    let customer = state
        .billing
        .create_customer(&account.email, account.display_name.as_deref(), account.id)
        .await?;
    state
        .accounts
        .set_stripe_customer_id(account.id, &customer.id)
        .await?;
    tracing::info!(account_id = %account.id, customer_id = %customer.id, "billing customer created");

    Ok(customer.id)
}

/// POST /billing/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.price_id.trim().is_empty() {
        return Err(ApiError::validation_field("priceId", "must not be empty"));
    }

    let account = load_account(&state, current.id).await?;
    let customer_id = ensure_billing_customer(&state, &account).await?;

    let base = state.app_base_url.trim_end_matches('/');
    let success_url = req.success_url.unwrap_or_else(|| {
        format!("{base}/billing?checkout=success&session_id={{CHECKOUT_SESSION_ID}}")
    });
    let cancel_url = req
        .cancel_url
        .unwrap_or_else(|| format!("{base}/billing?checkout=cancelled"));

    let session = state
        .billing
        .create_checkout_session(&customer_id, &req.price_id, &success_url, &cancel_url)
        .await?;

    Ok(Json(envelope::success(CheckoutSessionDto {
        session_id: session.id,
        url: session.url,
    })))
}

/// GET /billing/checkout?session_id=...
///
/// Unauthenticated confirmation polling after the hosted page redirects
/// back; the session id itself is the capability.
pub async fn confirm_checkout(
    State(state): State<AppState>,
    Query(query): Query<ConfirmCheckoutQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session_id = query
        .session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation_field("session_id", "is required"))?;

    let confirmation = state
        .billing
        .get_checkout_session(&session_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("CHECKOUT_SESSION_NOT_FOUND", "Checkout session not found")
        })?;

    Ok(Json(envelope::success(CheckoutConfirmationDto::from(
        confirmation,
    ))))
}

/// POST /billing/billing-portal
pub async fn billing_portal(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let account = load_account(&state, current.id).await?;
    let customer_id = ensure_billing_customer(&state, &account).await?;

    let session = state
        .billing
        .create_portal_session(&customer_id, &state.app_base_url)
        .await?;

    Ok(Json(envelope::success(PortalSessionDto { url: session.url })))
}

/// GET /billing/plans
pub async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let plans: Vec<PlanDto> = state
        .prices
        .list_active()
        .await?
        .into_iter()
        .map(PlanDto::from)
        .collect();
    Ok(Json(envelope::success(plans)))
}

/// POST /stripe/webhook
///
/// Takes the raw body: signature verification needs the exact bytes the
/// provider signed, so JSON parsing happens only after it passes.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(envelope::error(
                "MISSING_SIGNATURE",
                "Missing Stripe-Signature header",
                None,
            )),
        )
            .into_response();
    };

    let event = match state.webhook_verifier.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "webhook rejected before processing");
            return (
                err.status_code(),
                Json(envelope::error("WEBHOOK_REJECTED", &err.to_string(), None)),
            )
                .into_response();
        }
    };

    let event_id = event.id.clone();
    let event_type = event.event_type.clone();
    match state.reconciler.process(event).await {
        Ok(outcome) => {
            tracing::info!(
                %event_id,
                %event_type,
                ?outcome,
                "webhook processed"
            );
            let duplicate = outcome == ReconcileOutcome::AlreadyProcessed;
            Json(envelope::success(json!({
                "received": true,
                "duplicate": duplicate,
            })))
            .into_response()
        }
        Err(err) => {
            tracing::error!(%event_id, %event_type, error = %err, "webhook processing failed");
            (
                err.status_code(),
                Json(envelope::error(
                    "WEBHOOK_FAILED",
                    "Webhook processing failed",
                    None,
                )),
            )
                .into_response()
        }
    }
}
