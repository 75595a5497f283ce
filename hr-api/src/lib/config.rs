use std::env;

use config::builder::DefaultState;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Placeholder secret shipped in `config/default.toml`. Refused in production.
pub const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret-change-me";

const PRODUCTION: &str = "production";

/// Upper bound for `jwt.expiration_minutes` (one year).
pub const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

/// Application configuration for hr-api.
///
/// Loaded once at startup and handed to the components that need it.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// CORS origins; `*` allows any origin
    pub allowed_origins: Vec<String>,
}

/// PostgreSQL database configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT authentication configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_minutes: i64,
}

impl JwtConfig {
    /// # Errors
    /// Returns error if `expiration_minutes` is not a representable duration
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_minutes(self.expiration_minutes).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_minutes {} is out of range",
                self.expiration_minutes
            ))
        })
    }
}

/// Argon2id work factor for stored passwords.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordConfig {
    pub fn params(&self) -> auth::PasswordParams {
        auth::PasswordParams {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files with environment variable overrides.
    ///
    /// # Configuration Priority (highest to lowest)
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    ///
    /// # Errors
    /// Returns error if required values are missing or fail [`Config::validate`]
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Self::defaults()?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(
                Environment::with_prefix("")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins"),
            );

        Self::build(builder, &run_mode)
    }

    fn defaults() -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.http_port", 3000)?
            .set_default("server.allowed_origins", vec!["*"])?
            .set_default("database.max_connections", 5)?
            .set_default("jwt.expiration_minutes", 300)?
            .set_default("password.memory_kib", auth::PasswordParams::default().memory_kib)?
            .set_default("password.iterations", auth::PasswordParams::default().iterations)?
            .set_default(
                "password.parallelism",
                auth::PasswordParams::default().parallelism,
            )?
            .set_default("logging.level", "hr_api=info,tower_http=info")?
            .set_default("logging.json", false)
    }

    fn build(
        builder: config::ConfigBuilder<DefaultState>,
        run_mode: &str,
    ) -> Result<Self, ConfigError> {
        let config: Config = builder
            .set_override("environment", run_mode)?
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Reject configurations the service must not start with.
    ///
    /// # Errors
    /// * Empty JWT secret
    /// * Development placeholder secret while running in production
    /// * Token lifetime not in `1..=MAX_EXPIRATION_MINUTES`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }

        if self.is_production() && self.jwt.secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigError::Message(
                "jwt.secret is still the development placeholder".into(),
            ));
        }

        if !(1..=MAX_EXPIRATION_MINUTES).contains(&self.jwt.expiration_minutes) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_minutes must be between 1 and {}",
                MAX_EXPIRATION_MINUTES
            )));
        }

        Ok(())
    }
}
