//! Launchkit - SaaS starter REST API
//!
//! This crate implements the backend of a SaaS starter kit: account
//! authentication, owner-scoped notes, admin user management, and Stripe
//! subscription billing with idempotent webhook reconciliation.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
