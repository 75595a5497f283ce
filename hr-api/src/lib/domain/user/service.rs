use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::AuditLogger;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, AL>
where
    UR: UserRepository,
    AL: AuditLogger,
{
    repository: Arc<UR>,
    audit_log: Arc<AL>,
    authenticator: Arc<Authenticator>,
}

impl<UR, AL> UserService<UR, AL>
where
    UR: UserRepository,
    AL: AuditLogger,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `audit_log` - Sink for authentication decisions
    /// * `authenticator` - Password verification and token issuance
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, audit_log: Arc<AL>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            audit_log,
            authenticator,
        }
    }

    async fn lookup(&self, username: &str) -> Result<Option<User>, UserError> {
        match Username::new(username.to_string()) {
            Ok(username) => self.repository.find_by_username(&username).await,
            Err(_) => Ok(None),
        }
    }

    /// Password hashing is deliberately slow, keep it off the async workers.
    async fn run_blocking<T, F>(&self, f: F) -> Result<T, UserError>
    where
        F: FnOnce(&Authenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || f(&authenticator))
            .await
            .map_err(|e| UserError::Unknown(format!("Authentication task failed: {}", e)))
    }

    async fn reject_unknown_user(&self, password: String) -> UserError {
        match self
            .run_blocking(move |authenticator| authenticator.reject_unknown_user(&password))
            .await
        {
            Ok(rejection) => rejection.into(),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl<UR, AL> UserServicePort for UserService<UR, AL>
where
    UR: UserRepository,
    AL: AuditLogger,
{
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, UserError> {
        let LoginCommand { username, password } = command;

        let user = match self.lookup(&username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.audit_log
                    .info("user not found", &[("username", username.as_str())]);
                return Err(self.reject_unknown_user(password).await);
            }
            Err(e) => {
                self.audit_log.error("user lookup failed", &e);
                return Err(self.reject_unknown_user(password).await);
            }
        };

        let user_id = user.id;
        let subject = user_id.to_string();
        let stored_hash = user.password_hash;
        let token_subject = subject.clone();
        let result = self
            .run_blocking(move |authenticator| {
                authenticator.authenticate(&password, &stored_hash, &token_subject)
            })
            .await?;

        match result {
            Ok(authenticated) => {
                let expires_at = authenticated.expires_at.to_rfc3339();
                self.audit_log.info(
                    "login successful",
                    &[
                        ("username", username.as_str()),
                        ("id", subject.as_str()),
                        ("expires_at", expires_at.as_str()),
                    ],
                );
                Ok(LoginOutcome {
                    token: authenticated.access_token,
                    user_id,
                })
            }
            Err(AuthenticationError::InvalidCredentials) => {
                self.audit_log
                    .info("invalid password attempt", &[("id", subject.as_str())]);
                Err(UserError::InvalidCredentials)
            }
            Err(AuthenticationError::PasswordError(e)) => {
                self.audit_log.error("failed to compare password", &e);
                Err(UserError::Password(e))
            }
            Err(AuthenticationError::JwtError(e)) => {
                self.audit_log.error("failed to sign token", &e);
                Err(UserError::Token(e))
            }
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::sync::Mutex;

    use auth::PasswordHasher;
    use auth::PasswordParams;
    use chrono::Duration;
    use chrono::Utc;
    use mockall::mock;
    use uuid::Uuid;

    use super::*;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        entries: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        fn entries(&self) -> Vec<String> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl AuditLogger for RecordingLogger {
        fn info(&self, message: &str, fields: &[(&str, &str)]) {
            let fields: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            self.entries
                .lock()
                .unwrap()
                .push(format!("INFO {} {}", message, fields.join(" ")));
        }

        fn error(&self, message: &str, error: &dyn Error) {
            self.entries
                .lock()
                .unwrap()
                .push(format!("ERROR {}: {}", message, error));
        }
    }

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn authenticator() -> Arc<Authenticator> {
        let hasher = PasswordHasher::with_params(PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        Arc::new(Authenticator::new(SECRET, Duration::hours(5), hasher).unwrap())
    }

    fn stored_user(authenticator: &Authenticator, password: &str) -> User {
        User {
            id: UserId(Uuid::from_bytes([1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])),
            username: Username::new("testuser".to_string()).unwrap(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: authenticator.hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn login(username: &str, password: &str) -> LoginCommand {
        LoginCommand::new(username.to_string(), password.to_string())
    }

    #[tokio::test]
    async fn test_login_success() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "password123");
        let mut repository = MockTestUserRepository::new();
        let logger = Arc::new(RecordingLogger::default());

        repository
            .expect_find_by_username()
            .withf(|u| u.as_str() == "testuser")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(
            Arc::new(repository),
            Arc::clone(&logger),
            Arc::clone(&authenticator),
        );

        let outcome = service
            .login(login("testuser", "password123"))
            .await
            .expect("Login failed");

        assert_eq!(
            outcome.user_id.to_string(),
            "01020304-0000-0000-0000-000000000000"
        );

        let claims = authenticator.validate_token(&outcome.token).unwrap();
        assert_eq!(claims.subject(), outcome.user_id.to_string());

        let entries = logger.entries();
        assert!(entries
            .iter()
            .any(|e| e.starts_with("INFO login successful") && e.contains("expires_at=")));
        assert!(entries.iter().all(|e| !e.contains("password123")));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "password123");
        let mut repository = MockTestUserRepository::new();
        let logger = Arc::new(RecordingLogger::default());

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), Arc::clone(&logger), authenticator);

        let result = service.login(login("testuser", "wrong-password")).await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));

        let entries = logger.entries();
        assert!(entries
            .iter()
            .any(|e| e.starts_with("INFO invalid password attempt")));
        assert!(entries.iter().all(|e| !e.contains("wrong-password")));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut repository = MockTestUserRepository::new();
        let logger = Arc::new(RecordingLogger::default());

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(Arc::new(repository), Arc::clone(&logger), authenticator());

        let result = service.login(login("unknown", "anything")).await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
        assert!(logger
            .entries()
            .iter()
            .any(|e| e.starts_with("INFO user not found")));
    }

    #[tokio::test]
    async fn test_login_store_error_looks_like_bad_credentials() {
        let mut repository = MockTestUserRepository::new();
        let logger = Arc::new(RecordingLogger::default());

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let service = UserService::new(Arc::new(repository), Arc::clone(&logger), authenticator());

        let result = service.login(login("testuser", "password")).await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));

        // The distinction survives in the audit log only.
        assert!(logger
            .entries()
            .iter()
            .any(|e| e.starts_with("ERROR user lookup failed") && e.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_login_blank_username_skips_lookup() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_username().times(0);

        let service = UserService::new(
            Arc::new(repository),
            Arc::new(RecordingLogger::default()),
            authenticator(),
        );

        let result = service.login(login("", "password")).await;
        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_corrupt_stored_hash_is_server_fault() {
        let authenticator = authenticator();
        let mut user = stored_user(&authenticator, "password123");
        user.password_hash = "not-a-phc-string".to_string();
        let mut repository = MockTestUserRepository::new();
        let logger = Arc::new(RecordingLogger::default());

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(Arc::new(repository), Arc::clone(&logger), authenticator);

        let result = service.login(login("testuser", "password123")).await;
        assert!(matches!(
            result,
            Err(UserError::Password(auth::PasswordError::MalformedHash(_)))
        ));
        assert!(logger
            .entries()
            .iter()
            .any(|e| e.starts_with("ERROR failed to compare password")));
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let authenticator = authenticator();
        let user = stored_user(&authenticator, "password123");
        let user_id = user.id;
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = UserService::new(
            Arc::new(repository),
            Arc::new(RecordingLogger::default()),
            authenticator,
        );

        let user = service.get_user(&user_id).await.expect("Lookup failed");
        assert_eq!(user.id, user_id);
        assert_eq!(user.username.as_str(), "testuser");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = UserService::new(
            Arc::new(repository),
            Arc::new(RecordingLogger::default()),
            authenticator(),
        );

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_user_database_error() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("timeout".to_string())));

        let service = UserService::new(
            Arc::new(repository),
            Arc::new(RecordingLogger::default()),
            authenticator(),
        );

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result, Err(UserError::DatabaseError(_))));
    }
}
