use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::PasswordParams;
use chrono::Utc;
use hr_api::domain::user::models::User;
use hr_api::domain::user::models::UserId;
use hr_api::domain::user::models::Username;
use hr_api::domain::user::ports::UserRepository;
use hr_api::domain::user::service::UserService;
use hr_api::inbound::http::router::create_router;
use hr_api::outbound::logging::TracingAuditLogger;
use hr_api::user::errors::UserError;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_USERNAME: &str = "testuser";
pub const TEST_PASSWORD: &str = "password123";
pub const TEST_USER_ID: &str = "01020304-0000-0000-0000-000000000000";

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub repository: Arc<InMemoryUserRepository>,
}

impl TestApp {
    /// Spawn the application in a background task with one stored user
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Cheap work factor so the suite stays fast
        let hasher = PasswordHasher::with_params(PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let authenticator = Arc::new(
            Authenticator::new(TEST_SECRET, chrono::Duration::hours(5), hasher)
                .expect("Failed to build authenticator"),
        );

        let repository = Arc::new(InMemoryUserRepository::default());
        repository.insert(User {
            id: UserId(Uuid::from_bytes([1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0])),
            username: Username::new(TEST_USERNAME.to_string()).unwrap(),
            name: "Test User".to_string(),
            email: "testuser@example.com".to_string(),
            password_hash: authenticator.hash_password(TEST_PASSWORD).unwrap(),
            created_at: Utc::now(),
        });

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::new(TracingAuditLogger::new()),
            Arc::clone(&authenticator),
        ));

        let router = create_router(
            user_service,
            Arc::clone(&authenticator),
            &["*".to_string()],
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            authenticator,
            repository,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// POST /v1/login with the given credentials
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/v1/login")
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in as the seeded user and return the issued token
    pub async fn login_token(&self) -> String {
        let body: serde_json::Value = self
            .login(TEST_USERNAME, TEST_PASSWORD)
            .await
            .json()
            .await
            .expect("Failed to parse login response");

        body["token"]
            .as_str()
            .expect("Login response has no token")
            .to_string()
    }
}

/// Vec-backed [`UserRepository`] whose failures can be switched on.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn remove_all(&self) {
        self.users.lock().unwrap().clear();
    }

    /// Make every subsequent lookup fail with a database error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), UserError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UserError::DatabaseError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| &user.id == id)
            .cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| &user.username == username)
            .cloned())
    }
}

/// Throwaway Postgres database with migrations applied.
///
/// Connects through `DATABASE_URL` (any database on the target server; a fresh
/// one is created next to it). Tests skip when the variable is unset.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    admin_url: String,
}

impl TestDb {
    /// Create a new test database with a unique name
    pub async fn new() -> Option<Self> {
        let Ok(admin_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres-backed test");
            return None;
        };

        let db_name = format!(
            "test_hr_api_{}",
            Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to Postgres");

        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = admin_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            admin_url,
        })
    }

    /// Insert a user row directly, leaving `created_at` to the column default
    pub async fn insert_user(&self, id: Uuid, username: &str, name: &str, email: &str) {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, username, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(username)
        .bind("$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA")
        .execute(&self.pool)
        .await
        .expect("Failed to insert user");
    }

    /// Close the pool and drop the database
    pub async fn drop_database(self) {
        self.pool.close().await;

        if let Ok(mut conn) = PgConnection::connect(&self.admin_url).await {
            let _ = conn
                .execute(
                    format!(
                        r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                        self.db_name
                    )
                    .as_str(),
                )
                .await;

            let _ = conn
                .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, self.db_name).as_str())
                .await;
        }
    }
}
