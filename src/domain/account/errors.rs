//! Authentication and credential error types.

use thiserror::Error;

/// Errors raised by authentication, credential, and token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Email or password did not match. Deliberately generic: the same
    /// error covers unknown email, wrong password, and password-less
    /// (social-only) accounts so login responses don't leak which it was.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists but its active flag is false.
    #[error("Account is deactivated")]
    AccountDeactivated,

    /// The credential referenced an account that no longer exists.
    #[error("Account not found")]
    AccountNotFound,

    /// The bearer credential has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The bearer credential could not be decoded or its signature is wrong.
    #[error("Malformed token")]
    MalformedToken,

    /// No credential was supplied on a route that requires one.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Caller's role does not meet the route's minimum.
    #[error("Insufficient role")]
    InsufficientRole,

    /// The account has no password credential (social-only).
    #[error("Account has no password")]
    NoPassword,

    /// The new password equals the current one.
    #[error("New password must differ from the current password")]
    SamePassword,

    /// Password reset token is unknown, expired, or already used.
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Weak password: {0}")]
    WeakPassword(&'static str),

    /// Password hashing backend failed.
    #[error("Credential hashing failed: {0}")]
    Hashing(String),

    /// Upstream identity provider rejected or failed to verify the token.
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),
}
