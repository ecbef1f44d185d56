//! In-memory port implementations.
//!
//! Behavioral doubles used by the router tests (and handy for local
//! experiments): they enforce the same uniqueness and idempotency rules
//! as the Postgres adapters, just with mutexes instead of constraints.

mod accounts;
mod billing;
mod ledger;
mod mailer;
mod notes;
mod prices;
mod reset_tokens;
mod verifier;

pub use accounts::MemoryAccountRepository;
pub use billing::MemoryBillingProvider;
pub use ledger::{MemoryWebhookLedger, StoredSubscription};
pub use mailer::MemoryMailer;
pub use notes::MemoryNoteRepository;
pub use prices::MemoryPriceCatalog;
pub use reset_tokens::MemoryResetTokenRepository;
pub use verifier::StaticIdentityVerifier;
