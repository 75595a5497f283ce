use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenVerifier;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

const DECOY_PASSWORD: &str = "decoy-password-never-assigned";

/// Authentication coordinator combining password verification and JWT handling.
///
/// Owns the process-wide signing secret (through its issuer and verifier) and
/// the token lifetime. Immutable after construction, share it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
    token_verifier: TokenVerifier,
    token_ttl: Duration,
    decoy_hash: String,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// When `access_token` stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// Hashes a decoy password up front with `password_hasher`, so that a
    /// later [`reject_unknown_user`](Self::reject_unknown_user) costs the
    /// same as a real verification.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `token_ttl` - Lifetime of issued tokens
    /// * `password_hasher` - Hasher configured with the desired work factor
    ///
    /// # Errors
    /// * `JwtError::MissingSecret` - Secret is empty
    /// * `PasswordError` - Decoy hash could not be produced
    pub fn new(
        jwt_secret: &[u8],
        token_ttl: Duration,
        password_hasher: PasswordHasher,
    ) -> Result<Self, AuthenticationError> {
        let token_issuer = TokenIssuer::new(jwt_secret)?;
        let token_verifier = TokenVerifier::new(jwt_secret)?;
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            token_issuer,
            token_verifier,
            token_ttl,
            decoy_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and generate a JWT for `subject`.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Identifier placed in the token's `id` claim
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable or the hasher failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        match self.password_hasher.verify(stored_hash, password) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => return Err(AuthenticationError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        }

        let claims = Claims::for_subject(subject, self.token_ttl, Utc::now())?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| JwtError::InvalidLifetime(format!("exp {}", claims.exp)))?;
        let access_token = self.token_issuer.sign(&claims)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at,
        })
    }

    /// Spend one password verification on the decoy hash and fail.
    ///
    /// Used when no stored user exists, keeping response time independent of
    /// whether the username is known.
    pub fn reject_unknown_user(&self, password: &str) -> AuthenticationError {
        let _ = self.password_hasher.verify(&self.decoy_hash, password);
        AuthenticationError::InvalidCredentials
    }

    /// Generate a JWT for `subject` without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn generate_token(&self, subject: &str) -> Result<String, JwtError> {
        self.token_issuer.issue(subject, self.token_ttl)
    }

    /// Validate and decode a JWT.
    ///
    /// # Errors
    /// * `JwtError::InvalidToken` - Token failed any validation step
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_verifier.validate(token)
    }
}
