use thiserror::Error;

/// Stage at which a presented token was turned away.
///
/// Only meant for server-side logs. Clients always see the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionStage {
    Malformed,
    Algorithm,
    Signature,
    MissingExpiry,
    Expired,
    MissingSubject,
}

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("JWT signing secret is empty")]
    MissingSecret,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime out of range: {0}")]
    InvalidLifetime(String),

    /// Any verification failure. The message never varies with `stage`.
    #[error("Invalid or expired token")]
    InvalidToken {
        stage: RejectionStage,
        detail: String,
    },
}

impl JwtError {
    pub(crate) fn rejected(stage: RejectionStage, detail: impl ToString) -> Self {
        JwtError::InvalidToken {
            stage,
            detail: detail.to_string(),
        }
    }

    /// Rejection stage, if this is a verification failure.
    pub fn rejection_stage(&self) -> Option<RejectionStage> {
        match self {
            JwtError::InvalidToken { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
