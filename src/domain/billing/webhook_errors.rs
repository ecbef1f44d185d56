//! Webhook processing failures.
//!
//! The HTTP status each failure maps to is what steers Stripe's retry
//! machinery: 4xx means the delivery is bad and will never succeed, 5xx
//! means try again later.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid signature")]
    InvalidSignature,

    /// Older than the acceptance window; treated as a replay.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Timestamped further in the future than clock skew explains.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Signature header or JSON payload did not parse.
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The event's customer id is not linked to any local account. Can be
    /// a delivery that outran checkout's customer-id persistence, so it is
    /// surfaced as retryable.
    #[error("No account for billing customer")]
    AccountNotFound,

    /// Re-fetch found no such subscription upstream.
    #[error("Subscription not found upstream")]
    SubscriptionNotFound,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Whether Stripe should redeliver after seeing this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Provider(_)
                | Self::SubscriptionNotFound
                | Self::AccountNotFound
        )
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_retryable() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            // Untrusted or unparseable input; rejected before any
            // database work, and redelivery would fail the same way.
            StatusCode::BAD_REQUEST
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_input_is_final_and_bad_request() {
        for err in [
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
            WebhookError::ParseError("bad json".to_string()),
            WebhookError::MissingField("subscription"),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{err}");
            assert!(!err.is_retryable(), "{err}");
        }
    }

    #[test]
    fn infrastructure_failures_ask_for_redelivery() {
        for err in [
            WebhookError::Database("connection lost".to_string()),
            WebhookError::Provider("timeout".to_string()),
            WebhookError::SubscriptionNotFound,
            WebhookError::AccountNotFound,
        ] {
            assert_eq!(
                err.status_code(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "{err}"
            );
            assert!(err.is_retryable(), "{err}");
        }
    }
}
