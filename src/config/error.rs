//! Configuration error types.

use thiserror::Error;

/// Failure while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A setting that parsed but cannot be used.
///
/// `field` names the offending setting in env-var spelling (without the
/// `LAUNCHKIT__` prefix) so the message points straight at what to fix.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid configuration: {field} {problem}")]
pub struct ValidationError {
    pub field: &'static str,
    pub problem: &'static str,
}

impl ValidationError {
    pub(super) fn new(field: &'static str, problem: &'static str) -> Self {
        Self { field, problem }
    }

    pub(super) fn missing(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}
