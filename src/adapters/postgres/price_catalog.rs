//! PostgreSQL implementation of the price mirror.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::SubscriptionPrice;
use crate::domain::foundation::DomainError;
use crate::ports::PriceCatalog;

use super::db_error;

pub struct PostgresPriceCatalog {
    pool: PgPool,
}

impl PostgresPriceCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PriceRow {
    price_id: String,
    product_id: String,
    product_name: String,
    price_name: Option<String>,
    unit_amount: i64,
    currency: String,
    interval: String,
    active: bool,
}

impl From<PriceRow> for SubscriptionPrice {
    fn from(row: PriceRow) -> Self {
        SubscriptionPrice {
            price_id: row.price_id,
            product_id: row.product_id,
            product_name: row.product_name,
            price_name: row.price_name,
            unit_amount: row.unit_amount,
            currency: row.currency,
            interval: row.interval,
            active: row.active,
        }
    }
}

#[async_trait]
impl PriceCatalog for PostgresPriceCatalog {
    async fn list_active(&self) -> Result<Vec<SubscriptionPrice>, DomainError> {
        let rows = sqlx::query_as::<_, PriceRow>(
            "SELECT * FROM subscription_prices WHERE active ORDER BY unit_amount ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to list prices", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace_all(&self, prices: Vec<SubscriptionPrice>) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("failed to open transaction", e))?;

        sqlx::query("DELETE FROM subscription_prices")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to clear price mirror", e))?;

        for price in &prices {
            sqlx::query(
                r#"
                INSERT INTO subscription_prices (
                    price_id, product_id, product_name, price_name,
                    unit_amount, currency, interval, active
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(&price.price_id)
            .bind(&price.product_id)
            .bind(&price.product_name)
            .bind(&price.price_name)
            .bind(price.unit_amount)
            .bind(&price.currency)
            .bind(&price.interval)
            .bind(price.active)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to insert price", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("failed to commit price refresh", e))?;

        Ok(())
    }
}
