//! Billing domain: subscription mirror, Stripe events, and the webhook
//! reconciler.

mod reconciler;
mod stripe_event;
mod subscription;
mod webhook_errors;
mod webhook_verifier;

pub use reconciler::{
    patch_from_provider, plan, ReconcileOutcome, ReconcilePlan, SubscriptionReconciler,
};
pub use stripe_event::{
    InvoiceObject, StripeEvent, StripeEventData, StripeEventType, SubscriptionObject,
};
pub use subscription::{Subscription, SubscriptionPatch, SubscriptionPrice, SubscriptionStatus};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};
