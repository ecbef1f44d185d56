//! The error currency of ports and repositories.
//!
//! Richer per-area failures (auth, notes, webhooks) live as dedicated
//! enums next to their domain module; this is the common denominator the
//! storage and provider ports speak.

use std::collections::HashMap;
use std::fmt;

/// Machine-readable classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,

    AccountNotFound,
    NoteNotFound,
    SubscriptionNotFound,

    /// Email already registered.
    UserExists,
    /// Third-party identity already linked.
    ProviderLinkExists,

    DatabaseError,
    MailError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::AccountNotFound => "ACCOUNT_NOT_FOUND",
            ErrorCode::NoteNotFound => "NOTE_NOT_FOUND",
            ErrorCode::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            ErrorCode::UserExists => "USER_EXISTS",
            ErrorCode::ProviderLinkExists => "PROVIDER_LINK_EXISTS",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::MailError => "MAIL_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error with a code, a human-readable message, and optional
/// key/value details that surface in the response envelope.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Validation failure pinned to one field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_leads_with_the_code() {
        let err = DomainError::new(ErrorCode::AccountNotFound, "no such account");
        assert_eq!(err.to_string(), "[ACCOUNT_NOT_FOUND] no such account");
    }

    #[test]
    fn validation_pins_the_field() {
        let err = DomainError::validation("email", "must not be empty");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field").map(String::as_str), Some("email"));
    }

    #[test]
    fn details_accumulate_across_calls() {
        let err = DomainError::database("insert failed")
            .with_detail("table", "accounts")
            .with_detail("op", "insert");
        assert_eq!(err.details.len(), 2);
    }
}
