//! Ports: async traits decoupling the domain from infrastructure.

mod account_repository;
mod billing_provider;
mod identity_verifier;
mod mailer;
mod note_repository;
mod password_hasher;
mod price_catalog;
mod reset_token_repository;
mod token_codec;
mod webhook_ledger;

pub use account_repository::{AccountPage, AccountRepository};
pub use billing_provider::{
    BillingCustomer, BillingProvider, CheckoutConfirmation, CheckoutSession, PaymentError,
    PortalSession, ProviderSubscription,
};
pub use identity_verifier::{IdentityVerifier, VerifiedIdentity};
pub use mailer::{EmailMessage, Mailer};
pub use note_repository::NoteRepository;
pub use password_hasher::PasswordHasher;
pub use price_catalog::PriceCatalog;
pub use reset_token_repository::ResetTokenRepository;
pub use token_codec::{TokenClaims, TokenCodec};
pub use webhook_ledger::{LedgerEntry, LedgerOutcome, WebhookLedger};
