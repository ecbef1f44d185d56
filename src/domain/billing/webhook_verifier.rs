//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header is checked against the raw, unparsed
//! request body before any event is trusted or any database work starts.
//! Verification is pure crypto over bytes, which is why it lives in the
//! domain and not in the API client.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Events older than this are treated as replays.
const TOLERANCE_PAST_SECS: i64 = 300;

/// Allowance for the sender's clock running ahead of ours.
const TOLERANCE_FUTURE_SECS: i64 = 60;

/// Decomposed `Stripe-Signature` header.
///
/// Shape: `t=<unix seconds>,v1=<hex hmac>[,v1=...][,v0=...]`. Stripe sends
/// several `v1` entries while a signing secret is being rolled, so all of
/// them are kept and any single match accepts the payload. Unknown scheme
/// names are skipped for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_candidates: Vec<Vec<u8>>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp = None;
        let mut v1_candidates = Vec::new();

        for field in header.split(',') {
            let Some((scheme, value)) = field.split_once('=') else {
                return Err(WebhookError::ParseError(format!(
                    "malformed signature field '{field}'"
                )));
            };
            match scheme.trim() {
                "t" => {
                    let parsed = value.trim().parse().map_err(|_| {
                        WebhookError::ParseError("signature timestamp is not a number".into())
                    })?;
                    timestamp = Some(parsed);
                }
                "v1" => {
                    let decoded = hex::decode(value.trim()).map_err(|_| {
                        WebhookError::ParseError("v1 signature is not valid hex".into())
                    })?;
                    v1_candidates.push(decoded);
                }
                _ => {}
            }
        }

        match (timestamp, v1_candidates.is_empty()) {
            (Some(timestamp), false) => Ok(Self {
                timestamp,
                v1_candidates,
            }),
            (None, _) => Err(WebhookError::ParseError(
                "signature header has no timestamp".into(),
            )),
            (_, true) => Err(WebhookError::ParseError(
                "signature header has no v1 signature".into(),
            )),
        }
    }
}

/// Checks inbound webhook deliveries against the shared signing secret.
pub struct StripeWebhookVerifier {
    secret: String,
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the signature over `payload` and decodes the event.
    ///
    /// Order matters: the timestamp window is checked first (a replayed
    /// header fails cheaply), then the HMAC, and the JSON is only parsed
    /// once the bytes are proven authentic.
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;
        self.check_window(header.timestamp)?;

        let expected = self.mac_for(header.timestamp, payload);
        let authentic = header
            .v1_candidates
            .iter()
            .any(|candidate| candidate.len() == expected.len() && bool::from(candidate.ct_eq(&expected)));
        if !authentic {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    fn check_window(&self, timestamp: i64) -> Result<(), WebhookError> {
        let age = chrono::Utc::now().timestamp() - timestamp;
        if age > TOLERANCE_PAST_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -TOLERANCE_FUTURE_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }
        Ok(())
    }

    /// HMAC-SHA256 over `"{timestamp}.{payload}"`, Stripe's signed string.
    fn mac_for(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
