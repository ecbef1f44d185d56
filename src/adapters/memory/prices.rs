//! In-memory price mirror.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::SubscriptionPrice;
use crate::domain::foundation::DomainError;
use crate::ports::PriceCatalog;

#[derive(Default)]
pub struct MemoryPriceCatalog {
    prices: Mutex<Vec<SubscriptionPrice>>,
}

impl MemoryPriceCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceCatalog for MemoryPriceCatalog {
    async fn list_active(&self) -> Result<Vec<SubscriptionPrice>, DomainError> {
        let mut active: Vec<SubscriptionPrice> = self
            .prices
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.active)
            .cloned()
            .collect();
        active.sort_by_key(|p| p.unit_amount);
        Ok(active)
    }

    async fn replace_all(&self, prices: Vec<SubscriptionPrice>) -> Result<(), DomainError> {
        *self.prices.lock().unwrap() = prices;
        Ok(())
    }
}
