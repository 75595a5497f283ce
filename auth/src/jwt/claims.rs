use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Claims carried by an access token.
///
/// `id` is the subject (the user's UUID in canonical text form) and `exp` the
/// absolute expiry as a Unix timestamp. Both are mandatory on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject identifier
    pub id: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Create claims for a subject expiring `ttl` after `now`.
    ///
    /// # Arguments
    /// * `subject` - Subject identifier
    /// * `ttl` - Lifetime of the token
    /// * `now` - Issuance instant
    ///
    /// # Errors
    /// * `InvalidLifetime` - `now + ttl` falls outside the representable range
    pub fn for_subject(
        subject: impl ToString,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, JwtError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| JwtError::InvalidLifetime(format!("{} from {}", ttl, now)))?;

        Ok(Self {
            id: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: Some(now.timestamp()),
        })
    }

    pub fn subject(&self) -> &str {
        &self.id
    }

    /// Expiry as a timestamp, `None` if `exp` is out of chrono's range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// A token is expired once `now` reaches `exp`; `exp == now` is already expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }
}
