//! Stripe adapters: outbound API client for the billing provider port.
//!
//! Webhook signature verification does not live here; it is pure crypto
//! over the raw request body and sits in the billing domain.

mod api_types;
mod client;

pub use client::{StripeClient, StripeClientConfig};
