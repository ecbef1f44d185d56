//! PostgreSQL adapters - sqlx implementations of the repository ports.
//!
//! Cross-cutting invariants (unique email, unique event id, single-use
//! reset tokens) live in database constraints and transactions; these
//! adapters translate constraint violations into domain error codes.

mod account_repository;
mod note_repository;
mod price_catalog;
mod reset_token_repository;
mod webhook_ledger;

pub use account_repository::PostgresAccountRepository;
pub use note_repository::PostgresNoteRepository;
pub use price_catalog::PostgresPriceCatalog;
pub use reset_token_repository::PostgresResetTokenRepository;
pub use webhook_ledger::PostgresWebhookLedger;

use crate::domain::foundation::DomainError;

/// Uniform translation of unexpected sqlx failures.
fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, err))
}

/// Constraint name from a sqlx error, when it was a database-side violation.
fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}
