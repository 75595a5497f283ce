pub mod claims;
pub mod errors;
pub mod issuer;
pub mod verifier;

pub use claims::Claims;
pub use errors::JwtError;
pub use errors::RejectionStage;
pub use issuer::TokenIssuer;
pub use verifier::TokenVerifier;

use jsonwebtoken::Algorithm;

/// The only algorithm tokens are signed and accepted with.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
