//! Adapters: infrastructure implementations of the ports.
//!
//! - `postgres` - sqlx-backed repositories and the webhook ledger
//! - `stripe` - reqwest client for the payment provider API
//! - `auth` - JWT codec, Argon2 hashing, Google ID-token verification
//! - `email` - Resend transactional mail delivery
//! - `http` - axum routers, handlers, middleware, and the JSON envelope
//! - `memory` - in-memory port implementations backing the router tests

pub mod auth;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
