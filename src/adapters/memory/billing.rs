//! In-memory billing provider.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::SubscriptionPrice;
use crate::domain::foundation::AccountId;
use crate::ports::{
    BillingCustomer, BillingProvider, CheckoutConfirmation, CheckoutSession, PaymentError,
    PortalSession, ProviderSubscription,
};

#[derive(Default)]
struct Inner {
    customer_seq: u32,
    session_seq: u32,
    created_customers: Vec<String>,
    checkout_sessions: HashMap<String, CheckoutConfirmation>,
    subscriptions: HashMap<String, ProviderSubscription>,
    prices: Vec<SubscriptionPrice>,
}

/// Scriptable provider double: customers and sessions get deterministic
/// ids, subscriptions and prices are whatever the test installed.
#[derive(Default)]
pub struct MemoryBillingProvider {
    inner: Mutex<Inner>,
}

impl MemoryBillingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a subscription for `get_subscription` re-fetches.
    pub fn set_subscription(&self, subscription: ProviderSubscription) {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .insert(subscription.id.clone(), subscription);
    }

    /// Overwrite the confirmation a session id polls back.
    pub fn set_checkout_confirmation(&self, confirmation: CheckoutConfirmation) {
        self.inner
            .lock()
            .unwrap()
            .checkout_sessions
            .insert(confirmation.id.clone(), confirmation);
    }

    /// Install the catalog returned by `list_prices`.
    pub fn set_prices(&self, prices: Vec<SubscriptionPrice>) {
        self.inner.lock().unwrap().prices = prices;
    }

    /// How many customers were created upstream, for race assertions.
    pub fn created_customer_count(&self) -> usize {
        self.inner.lock().unwrap().created_customers.len()
    }
}

#[async_trait]
impl BillingProvider for MemoryBillingProvider {
    async fn create_customer(
        &self,
        _email: &str,
        _name: Option<&str>,
        _account_id: AccountId,
    ) -> Result<BillingCustomer, PaymentError> {
        let mut inner = self.inner.lock().unwrap();
        inner.customer_seq += 1;
        let id = format!("cus_mem_{}", inner.customer_seq);
        inner.created_customers.push(id.clone());
        Ok(BillingCustomer { id })
    }

    async fn create_checkout_session(
        &self,
        _customer_id: &str,
        _price_id: &str,
        _success_url: &str,
        _cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut inner = self.inner.lock().unwrap();
        inner.session_seq += 1;
        let id = format!("cs_mem_{}", inner.session_seq);
        inner.checkout_sessions.insert(
            id.clone(),
            CheckoutConfirmation {
                id: id.clone(),
                status: "open".to_string(),
                payment_status: Some("unpaid".to_string()),
            },
        );
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/{}", id),
            id,
        })
    }

    async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CheckoutConfirmation>, PaymentError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .checkout_sessions
            .get(session_id)
            .cloned())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        _return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        Ok(PortalSession {
            url: format!("https://billing.stripe.test/{}", customer_id),
        })
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderSubscription>, PaymentError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription_id)
            .cloned())
    }

    async fn list_prices(&self) -> Result<Vec<SubscriptionPrice>, PaymentError> {
        Ok(self.inner.lock().unwrap().prices.clone())
    }
}
