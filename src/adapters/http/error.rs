//! HTTP error type: every failure a handler can produce, rendered into
//! the JSON envelope with a machine-readable code.
//!
//! Conversions from the domain error types live here so handlers can use
//! `?` throughout; nothing outside this module decides status codes.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::domain::account::{AuthError, PolicyViolation};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::note::NoteError;
use crate::ports::PaymentError;

use super::envelope;

/// Whether 500 responses carry the underlying failure message.
///
/// Set once at startup from the environment: detailed in development,
/// suppressed in production. Defaults to suppressed.
static EXPOSE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

pub fn expose_error_details(expose: bool) {
    EXPOSE_ERROR_DETAILS.store(expose, Ordering::Relaxed);
}

const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred";

/// A failure ready to be rendered as an envelope response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
    }

    /// Validation failure pinned to a single field.
    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut details = serde_json::Map::new();
        details.insert(field.to_string(), Value::String(message.clone()));
        let mut err = Self::validation(message);
        err.details = Some(Value::Object(details));
        err
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// Unexpected failure: logged in full, detailed to the client only
    /// when error exposure is on.
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(%detail, "internal error");
        let message = if EXPOSE_ERROR_DETAILS.load(Ordering::Relaxed) {
            detail
        } else {
            GENERIC_INTERNAL_MESSAGE.to_string()
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = envelope::error(self.code, &self.message, self.details);
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
            }
            AuthError::AccountDeactivated => {
                Self::new(StatusCode::UNAUTHORIZED, "ACCOUNT_DEACTIVATED", message)
            }
            AuthError::AccountNotFound => {
                Self::new(StatusCode::UNAUTHORIZED, "ACCOUNT_NOT_FOUND", message)
            }
            AuthError::TokenExpired => {
                Self::new(StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", message)
            }
            AuthError::MalformedToken => {
                Self::new(StatusCode::BAD_REQUEST, "MALFORMED_TOKEN", message)
            }
            AuthError::AuthenticationRequired => {
                Self::new(StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", message)
            }
            AuthError::InsufficientRole => {
                Self::new(StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE", message)
            }
            AuthError::NoPassword => Self::new(StatusCode::BAD_REQUEST, "NO_PASSWORD", message),
            AuthError::SamePassword => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "SAME_PASSWORD", message)
            }
            AuthError::InvalidResetToken => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_TOKEN", message)
            }
            AuthError::InvalidEmail => Self::validation_field("email", message),
            AuthError::WeakPassword(_) => Self::validation_field("password", message),
            AuthError::Hashing(detail) => Self::internal(detail),
            AuthError::IdentityProvider(_) => {
                Self::new(StatusCode::UNAUTHORIZED, "GOOGLE_AUTH_FAILED", message)
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let details = if err.details.is_empty() {
            None
        } else {
            serde_json::to_value(&err.details).ok()
        };
        let mut api = match err.code {
            ErrorCode::ValidationFailed => Self::validation(err.message),
            ErrorCode::AccountNotFound => Self::not_found("ACCOUNT_NOT_FOUND", err.message),
            ErrorCode::NoteNotFound => Self::not_found("NOTE_NOT_FOUND", err.message),
            ErrorCode::SubscriptionNotFound => {
                Self::not_found("SUBSCRIPTION_NOT_FOUND", err.message)
            }
            ErrorCode::UserExists => Self::new(StatusCode::CONFLICT, "USER_EXISTS", err.message),
            ErrorCode::ProviderLinkExists => {
                Self::new(StatusCode::CONFLICT, "PROVIDER_LINK_EXISTS", err.message)
            }
            ErrorCode::DatabaseError | ErrorCode::MailError | ErrorCode::InternalError => {
                Self::internal(err.message)
            }
        };
        if api.details.is_none() {
            api.details = details;
        }
        api
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        let field = match err {
            NoteError::InvalidTitle => "title",
            NoteError::ContentTooLong => "content",
        };
        Self::validation_field(field, err.to_string())
    }
}

impl From<PolicyViolation> for ApiError {
    fn from(violation: PolicyViolation) -> Self {
        match violation {
            PolicyViolation::RequiresSuperAdmin => Self::new(
                StatusCode::FORBIDDEN,
                "SUPER_ADMIN_REQUIRED",
                "Only a super admin may assign the super admin role",
            ),
            PolicyViolation::SuperAdminTargetProtected => Self::new(
                StatusCode::FORBIDDEN,
                "SUPER_ADMIN_PROTECTED",
                "Only a super admin may modify a super admin account",
            ),
            PolicyViolation::CannotDemoteSelf => Self::new(
                StatusCode::BAD_REQUEST,
                "CANNOT_DEMOTE_SELF",
                "A super admin may not demote their own account",
            ),
            PolicyViolation::SuperAdminCannotBeDeactivated => Self::new(
                StatusCode::BAD_REQUEST,
                "CANNOT_DEACTIVATE_SUPER_ADMIN",
                "A super admin account cannot be deactivated",
            ),
            PolicyViolation::CannotDeactivateSelf => Self::new(
                StatusCode::BAD_REQUEST,
                "CANNOT_DEACTIVATE_SELF",
                "An account may not deactivate itself",
            ),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        tracing::error!(error = %err, "payment provider call failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "PAYMENT_PROVIDER_ERROR",
            if EXPOSE_ERROR_DETAILS.load(Ordering::Relaxed) {
                err.to_string()
            } else {
                GENERIC_INTERNAL_MESSAGE.to_string()
            },
        )
    }
}

/// JSON body extractor whose rejection is the standard envelope instead
/// of axum's plain-text 400/415.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}
