//! Shared harness for the router tests.
//!
//! Builds the full API router over the in-memory adapters and drives it
//! with `tower::ServiceExt::oneshot`, so every test exercises the real
//! middleware, extractors, handlers, and envelope.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;

use launchkit::adapters::auth::{Argon2PasswordHasher, JwtTokenCodec};
use launchkit::adapters::http::{api_router, AppState, CookieSettings};
use launchkit::adapters::memory::{
    MemoryAccountRepository, MemoryBillingProvider, MemoryMailer, MemoryNoteRepository,
    MemoryPriceCatalog, MemoryResetTokenRepository, MemoryWebhookLedger, StaticIdentityVerifier,
};
use launchkit::domain::account::Role;
use launchkit::domain::billing::{StripeWebhookVerifier, SubscriptionReconciler};
use launchkit::domain::foundation::AccountId;
use launchkit::ports::AccountRepository;

pub const COOKIE_NAME: &str = "lk_token";
pub const WEBHOOK_SECRET: &str = "whsec_router_tests";
pub const PASSWORD: &str = "Secret123";

pub struct TestApp {
    pub router: Router,
    pub accounts: Arc<MemoryAccountRepository>,
    pub notes: Arc<MemoryNoteRepository>,
    pub prices: Arc<MemoryPriceCatalog>,
    pub billing: Arc<MemoryBillingProvider>,
    pub mailer: Arc<MemoryMailer>,
    pub ledger: Arc<MemoryWebhookLedger>,
}

pub fn spawn() -> TestApp {
    spawn_with_verifier(StaticIdentityVerifier::new())
}

pub fn spawn_with_verifier(verifier: StaticIdentityVerifier) -> TestApp {
    let accounts = Arc::new(MemoryAccountRepository::new());
    let notes = Arc::new(MemoryNoteRepository::new());
    let reset_tokens = Arc::new(MemoryResetTokenRepository::new(accounts.clone()));
    let prices = Arc::new(MemoryPriceCatalog::new());
    let billing = Arc::new(MemoryBillingProvider::new());
    let mailer = Arc::new(MemoryMailer::new());
    let ledger = Arc::new(MemoryWebhookLedger::new(accounts.clone()));
    let reconciler = Arc::new(SubscriptionReconciler::new(ledger.clone(), billing.clone()));

    let state = AppState {
        accounts: accounts.clone(),
        notes: notes.clone(),
        reset_tokens,
        prices: prices.clone(),
        billing: billing.clone(),
        identity: Arc::new(verifier),
        mailer: mailer.clone(),
        password_hasher: Arc::new(Argon2PasswordHasher),
        token_codec: Arc::new(JwtTokenCodec::new(
            &SecretString::new("router-test-secret".to_string()),
            Duration::from_secs(3600),
        )),
        webhook_verifier: Arc::new(StripeWebhookVerifier::new(WEBHOOK_SECRET)),
        reconciler,
        cookies: CookieSettings::new(COOKIE_NAME, false, false, 30),
        app_base_url: "http://localhost:5173".to_string(),
    };

    TestApp {
        router: api_router(state),
        accounts,
        notes,
        prices,
        billing,
        mailer,
        ledger,
    }
}

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    pub headers: HeaderMap,
}

impl ApiResponse {
    /// The `code` field of the error envelope.
    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or("")
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> ApiResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        ApiResponse {
            status,
            body,
            headers,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: Value) -> ApiResponse {
        self.request(Method::POST, path, None, Some(body)).await
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: Value) -> ApiResponse {
        self.request(Method::POST, path, Some(token), Some(body))
            .await
    }

    pub async fn get(&self, path: &str) -> ApiResponse {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> ApiResponse {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> ApiResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: Value) -> ApiResponse {
        self.request(Method::PUT, path, Some(token), Some(body))
            .await
    }

    pub async fn patch_auth(&self, path: &str, token: &str, body: Value) -> ApiResponse {
        self.request(Method::PATCH, path, Some(token), Some(body))
            .await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> ApiResponse {
        self.request(Method::DELETE, path, Some(token), None).await
    }

    /// Signs up an account and returns its bearer token.
    pub async fn signup(&self, email: &str) -> String {
        let response = self
            .post(
                "/auth/signup",
                json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "signup failed: {}", response.body);
        response.body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn account_id(&self, email: &str) -> AccountId {
        self.accounts
            .find_by_email(email)
            .await
            .unwrap()
            .expect("account exists")
            .id
    }

    /// Directly promotes an account, bypassing the policy (test setup).
    pub async fn set_role(&self, email: &str, role: Role) {
        let id = self.account_id(email).await;
        self.accounts.set_role(id, role).await.unwrap();
    }

    /// Delivers a signed webhook payload.
    pub async fn webhook(&self, payload: &Value) -> ApiResponse {
        let raw = payload.to_string();
        let timestamp = chrono::Utc::now().timestamp();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/stripe/webhook")
            .header("Stripe-Signature", sign_webhook(&raw, timestamp))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        self.send(request).await
    }

    /// Delivers a payload with a garbage signature.
    pub async fn webhook_unsigned(&self, payload: &Value) -> ApiResponse {
        let raw = payload.to_string();
        let timestamp = chrono::Utc::now().timestamp();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/stripe/webhook")
            .header(
                "Stripe-Signature",
                format!("t={},v1={}", timestamp, "ab".repeat(32)),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        self.send(request).await
    }
}

/// Stripe-style signature header over `timestamp.payload`.
pub fn sign_webhook(payload: &str, timestamp: i64) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(signed_payload.as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

/// A `customer.subscription.updated`-shaped event payload.
pub fn subscription_event(
    event_id: &str,
    event_type: &str,
    subscription_id: &str,
    customer_id: &str,
    status: &str,
) -> Value {
    json!({
        "id": event_id,
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "livemode": false,
        "data": {
            "object": {
                "id": subscription_id,
                "customer": customer_id,
                "status": status,
                "cancel_at_period_end": false,
                "current_period_start": 1704067200,
                "current_period_end": 1706745600,
                "items": {
                    "data": [{"price": {"id": "price_1", "product": "prod_1"}}]
                }
            }
        }
    })
}

/// Pulls the raw reset token out of the emailed link.
pub fn extract_reset_token(html: &str) -> String {
    let start = html.find("token=").expect("reset link in email") + "token=".len();
    let rest = &html[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    rest[..end].to_string()
}
