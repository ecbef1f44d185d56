//! Credential adapters: token codec, password hashing, social identity.

mod google;
mod jwt;
mod password;

pub use google::GoogleIdentityVerifier;
pub use jwt::JwtTokenCodec;
pub use password::Argon2PasswordHasher;
