//! PriceCatalog port - local mirror of the provider's price catalog.
//!
//! The mirror backs the public `/billing/plans` endpoint so plan listings
//! don't hit the provider on every request. It is refreshed wholesale from
//! the provider at startup.

use async_trait::async_trait;

use crate::domain::billing::SubscriptionPrice;
use crate::domain::foundation::DomainError;

/// Port for the price mirror.
#[async_trait]
pub trait PriceCatalog: Send + Sync {
    /// Active prices, cheapest first.
    async fn list_active(&self) -> Result<Vec<SubscriptionPrice>, DomainError>;

    /// Replace the whole mirror with a fresh provider snapshot.
    async fn replace_all(&self, prices: Vec<SubscriptionPrice>) -> Result<(), DomainError>;
}
