//! JWT implementation of the token codec.
//!
//! HS256-signed access tokens carrying the account id and email. The
//! expiry embedded at issue time is what the guard chain later enforces.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::account::AuthError;
use crate::domain::foundation::AccountId;
use crate::ports::{TokenClaims, TokenCodec};

/// Claims embedded in the access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id.
    sub: String,
    email: String,
    /// Issued-at (Unix seconds).
    iat: i64,
    /// Expiry (Unix seconds).
    exp: i64,
}

/// HS256 token codec backed by `jsonwebtoken`.
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenCodec {
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, account_id: AccountId, email: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        encode(&jsonwebtoken::Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Hashing(format!("token signing failed: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            })?;

        let account_id =
            AccountId::parse(&data.claims.sub).map_err(|_| AuthError::MalformedToken)?;

        Ok(TokenClaims {
            account_id,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec_with_ttl(ttl: Duration) -> JwtTokenCodec {
        JwtTokenCodec::new(&SecretString::new("unit-test-secret".to_string()), ttl)
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let codec = codec_with_ttl(Duration::from_secs(3600));
        let id = AccountId::generate();

        let token = codec.issue(id, "a@x.com").unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.account_id, id);
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn garbage_token_is_malformed() {
        let codec = codec_with_ttl(Duration::from_secs(3600));
        assert_eq!(
            codec.verify("not-a-jwt"),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let issuing = codec_with_ttl(Duration::from_secs(3600));
        let verifying =
            JwtTokenCodec::new(&SecretString::new("other-secret".to_string()), Duration::from_secs(3600));

        let token = issuing.issue(AccountId::generate(), "a@x.com").unwrap();
        assert_eq!(verifying.verify(&token), Err(AuthError::MalformedToken));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        // jsonwebtoken's default validation has 60s leeway; go well past it.
        let codec = codec_with_ttl(Duration::from_secs(0));
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: AccountId::generate().to_string(),
            email: "a@x.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert_eq!(codec.verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn token_with_non_uuid_subject_is_malformed() {
        let codec = codec_with_ttl(Duration::from_secs(3600));
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "user-42".to_string(),
            email: "a@x.com".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert_eq!(codec.verify(&token), Err(AuthError::MalformedToken));
    }
}
