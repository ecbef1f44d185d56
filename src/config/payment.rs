//! Stripe settings.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// Secret API key (`sk_test_` or `sk_live_`).
    pub stripe_api_key: String,

    /// Webhook signing secret from the Stripe dashboard (`whsec_`).
    pub stripe_webhook_secret: String,
}

impl PaymentConfig {
    /// Whether the configured key targets Stripe's test mode.
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// The prefix checks catch the classic swap of the publishable key
    /// (`pk_`) for the secret one before any request is made.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::missing("PAYMENT__STRIPE_API_KEY"));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::new(
                "PAYMENT__STRIPE_API_KEY",
                "must be a secret key (sk_...)",
            ));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::missing("PAYMENT__STRIPE_WEBHOOK_SECRET"));
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::new(
                "PAYMENT__STRIPE_WEBHOOK_SECRET",
                "must start with whsec_",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str, webhook_secret: &str) -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: api_key.to_string(),
            stripe_webhook_secret: webhook_secret.to_string(),
        }
    }

    #[test]
    fn test_mode_follows_the_key_prefix() {
        assert!(config("sk_test_abc", "whsec_x").is_test_mode());
        assert!(!config("sk_live_abc", "whsec_x").is_test_mode());
    }

    #[test]
    fn valid_key_pair_passes() {
        assert!(config("sk_test_abc123", "whsec_xyz789").validate().is_ok());
    }

    #[test]
    fn publishable_key_is_caught() {
        let err = config("pk_test_abc", "whsec_x").validate().unwrap_err();
        assert_eq!(err.field, "PAYMENT__STRIPE_API_KEY");
    }

    #[test]
    fn missing_or_mislabeled_webhook_secret_fails() {
        assert!(config("sk_test_abc", "").validate().is_err());
        assert!(config("sk_test_abc", "secret_x").validate().is_err());
        assert!(PaymentConfig::default().validate().is_err());
    }
}
