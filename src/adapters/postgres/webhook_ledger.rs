//! PostgreSQL implementation of the webhook ledger.
//!
//! The whole idempotency protocol runs inside one transaction: claim the
//! event id, short-circuit if it was already processed, apply the
//! subscription upsert, stamp processed_at. A failure anywhere rolls the
//! claim back, so Stripe's redelivery redoes the work cleanly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::SubscriptionPatch;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{LedgerEntry, LedgerOutcome, WebhookLedger};

use super::db_error;

pub struct PostgresWebhookLedger {
    pool: PgPool,
}

impl PostgresWebhookLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookLedger for PostgresWebhookLedger {
    async fn process(
        &self,
        entry: LedgerEntry,
        patch: Option<SubscriptionPatch>,
    ) -> Result<LedgerOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("failed to open webhook transaction", e))?;

        // Claim the event id. The primary key arbitrates concurrent
        // duplicate deliveries: the loser's insert is a no-op and it then
        // blocks on the row lock below until the winner commits.
        let claimed = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&entry.event_id)
        .bind(&entry.event_type)
        .bind(&entry.payload)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("failed to record webhook event", e))?;

        if claimed.rows_affected() == 0 {
            let processed_at: Option<DateTime<Utc>> = sqlx::query_scalar(
                "SELECT processed_at FROM webhook_events WHERE event_id = $1 FOR UPDATE",
            )
            .bind(&entry.event_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("failed to load webhook event", e))?;

            if processed_at.is_some() {
                // Fully handled before; nothing to redo.
                return Ok(LedgerOutcome::AlreadyProcessed);
            }
            // Row exists but a previous attempt failed before stamping;
            // fall through and redo the transition.
        }

        if let Some(patch) = &patch {
            apply_patch(&mut tx, patch).await?;
        }

        sqlx::query("UPDATE webhook_events SET processed_at = now() WHERE event_id = $1")
            .bind(&entry.event_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to stamp webhook event", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("failed to commit webhook transaction", e))?;

        Ok(LedgerOutcome::Processed)
    }
}

/// Upserts the subscription mirror, keyed by the external subscription id.
///
/// The owning account is resolved from the billing-customer reference; a
/// missing link aborts the transaction so the delivery is retried once the
/// customer id has been persisted.
async fn apply_patch(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    patch: &SubscriptionPatch,
) -> Result<(), DomainError> {
    let account_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM accounts WHERE stripe_customer_id = $1")
            .bind(&patch.stripe_customer_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("failed to resolve billing customer", e))?;

    let account_id = account_id.ok_or_else(|| {
        DomainError::new(
            ErrorCode::AccountNotFound,
            format!(
                "no account for billing customer {}",
                patch.stripe_customer_id
            ),
        )
    })?;

    sqlx::query(
        r#"
        INSERT INTO subscriptions (
            id, account_id, stripe_subscription_id, stripe_product_id, stripe_price_id,
            status, current_period_start, current_period_end, cancel_at_period_end
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (stripe_subscription_id) DO UPDATE SET
            stripe_product_id = EXCLUDED.stripe_product_id,
            stripe_price_id = EXCLUDED.stripe_price_id,
            status = EXCLUDED.status,
            current_period_start = EXCLUDED.current_period_start,
            current_period_end = EXCLUDED.current_period_end,
            cancel_at_period_end = EXCLUDED.cancel_at_period_end,
            updated_at = now()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account_id)
    .bind(&patch.stripe_subscription_id)
    .bind(&patch.stripe_product_id)
    .bind(&patch.stripe_price_id)
    .bind(patch.status.as_str())
    .bind(patch.current_period_start)
    .bind(patch.current_period_end)
    .bind(patch.cancel_at_period_end)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("failed to upsert subscription", e))?;

    Ok(())
}
