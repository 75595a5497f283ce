use std::collections::HashSet;

use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use super::errors::RejectionStage;
use super::SIGNING_ALGORITHM;

/// Validates access tokens signed by a [`TokenIssuer`](super::TokenIssuer)
/// holding the same secret.
///
/// Checks run in order: parse, header algorithm, signature, expiry. The first
/// failure ends validation. All failures surface as [`JwtError::InvalidToken`].
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a new verifier.
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is compared in `validate_at` so `exp == now` counts as expired
        // and the clock can be supplied by the caller.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Validate a token against the current time.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, wrong algorithm, bad signature, missing
    ///   or reached expiry, or empty subject
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let stage = match e.kind() {
                    ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                        RejectionStage::Algorithm
                    }
                    ErrorKind::InvalidSignature => RejectionStage::Signature,
                    ErrorKind::MissingRequiredClaim(_) => RejectionStage::MissingExpiry,
                    ErrorKind::ExpiredSignature => RejectionStage::Expired,
                    _ => RejectionStage::Malformed,
                };
                JwtError::rejected(stage, e)
            })?;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::rejected(
                RejectionStage::Expired,
                format!("exp {} <= now {}", claims.exp, now.timestamp()),
            ));
        }

        if claims.id.trim().is_empty() {
            return Err(JwtError::rejected(
                RejectionStage::MissingSubject,
                "empty subject",
            ));
        }

        Ok(claims)
    }
}
