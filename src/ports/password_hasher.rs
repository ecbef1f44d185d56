//! PasswordHasher port - one-way password hashing.

use crate::domain::account::AuthError;

/// Port for password hashing and verification.
///
/// Hashing is CPU-bound, not async; implementations are expected to be
/// cheap enough to run inline on the request path (Argon2 defaults).
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a random salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a plaintext password against a stored hash.
    ///
    /// `Ok(false)` means the password did not match; `Err` means the hash
    /// itself could not be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}
