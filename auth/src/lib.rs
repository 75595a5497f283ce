//! Authentication primitives for the HR API.
//!
//! - Password hashing (Argon2id, tunable work factor)
//! - Access token issuance and verification (HS256 JWT)
//! - Authentication coordination
//!
//! Nothing here performs I/O. User lookup and HTTP concerns live in the
//! service that embeds this crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordError;
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify(&hash, "my_password").is_ok());
//! assert_eq!(hasher.verify(&hash, "not_it"), Err(PasswordError::Mismatch));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenIssuer, TokenVerifier};
//! use chrono::Duration;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let verifier = TokenVerifier::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//!
//! let token = issuer.issue("user123", Duration::hours(5)).unwrap();
//! let claims = verifier.validate(&token).unwrap();
//! assert_eq!(claims.subject(), "user123");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, PasswordHasher};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::hours(5),
//!     PasswordHasher::new(),
//! )
//! .unwrap();
//!
//! let hash = auth.hash_password("password123").unwrap();
//! let result = auth.authenticate("password123", &hash, "user123").unwrap();
//!
//! let claims = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(claims.subject(), "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::RejectionStage;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordParams;
