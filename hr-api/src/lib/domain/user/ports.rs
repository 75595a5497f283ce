use std::error::Error;

use async_trait::async_trait;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `command` - Submitted username and plaintext password
    ///
    /// # Returns
    /// Signed token and the authenticated user's ID
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user, failed lookup, or wrong password
    /// * `Password` - Stored hash unusable or hasher failure
    /// * `Token` - Token signing failed
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Returns
    /// User entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
}

/// Read access to stored users.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user by identifier.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Arguments
    /// * `username` - Username to search for
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
}

/// Audit log for authentication decisions.
///
/// Implementations must never receive plaintext passwords or tokens; callers
/// pass identifiers only.
pub trait AuditLogger: Send + Sync + 'static {
    /// Record a notable but expected event with key/value context.
    fn info(&self, message: &str, fields: &[(&str, &str)]);

    /// Record a failure with its full internal error.
    fn error(&self, message: &str, error: &dyn Error);
}
