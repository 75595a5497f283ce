use thiserror::Error;

/// Error type for password operations.
///
/// `Mismatch` is the only variant that means "wrong password". Every other
/// variant points at bad stored data or a hasher fault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password does not match stored hash")]
    Mismatch,

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
