//! BillingProvider port - outbound payment provider operations.
//!
//! Covers the customer/checkout/portal lifecycle plus the re-fetch the
//! webhook reconciler performs for invoice events. Webhook *verification*
//! is not here: it is pure crypto over the raw body and lives in the
//! billing domain.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::{SubscriptionPrice, SubscriptionStatus};
use crate::domain::foundation::AccountId;

/// Errors from outbound payment-provider calls.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// Transport-level failure reaching the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with an error payload.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider's response could not be decoded.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Customer record in the payment system.
#[derive(Debug, Clone)]
pub struct BillingCustomer {
    /// Provider's customer id (cus_xxx).
    pub id: String,
}

/// A newly created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page the client is redirected to.
    pub url: String,
}

/// Point-in-time state of a checkout session, used for confirmation polling.
#[derive(Debug, Clone)]
pub struct CheckoutConfirmation {
    pub id: String,
    /// Session status: open, complete, or expired.
    pub status: String,
    /// Payment status: paid, unpaid, or no_payment_required.
    pub payment_status: Option<String>,
}

/// A billing-portal session.
#[derive(Debug, Clone)]
pub struct PortalSession {
    pub url: String,
}

/// Subscription as reported by the provider (source of truth on re-fetch).
#[derive(Debug, Clone)]
pub struct ProviderSubscription {
    pub id: String,
    pub customer_id: String,
    pub status: SubscriptionStatus,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
}

/// Port for payment provider integrations.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a customer, tagging it with the local account id as metadata.
    async fn create_customer(
        &self,
        email: &str,
        name: Option<&str>,
        account_id: AccountId,
    ) -> Result<BillingCustomer, PaymentError>;

    /// Create a subscription-mode checkout session for a price.
    async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Fetch a checkout session for confirmation polling.
    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CheckoutConfirmation>, PaymentError>;

    /// Create a billing-portal session for subscription self-management.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError>;

    /// Fetch a subscription by provider id; `None` when it does not exist.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderSubscription>, PaymentError>;

    /// List active recurring prices from the provider catalog.
    async fn list_prices(&self) -> Result<Vec<SubscriptionPrice>, PaymentError>;
}
