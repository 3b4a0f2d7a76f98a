//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Redis configuration
    pub redis: RedisSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// Rate limiting configuration
    pub rate_limit: RateLimitSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Google OAuth2 client and API endpoints
    pub google: GoogleSettings,

    /// reCAPTCHA verification and attempt limiting
    pub recaptcha: ReCaptchaSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-31)
    pub machine_id: u16,

    /// Node ID within the machine (0-31)
    pub node_id: u16,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Switch the limiter off entirely (local development)
    pub enabled: bool,

    /// Requests allowed per window on authenticated API routes
    pub api_requests_per_window: u32,

    /// Requests allowed per window on sign-up, sign-in and token refresh
    pub auth_requests_per_window: u32,

    /// Sliding window length in seconds
    pub window_seconds: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Google OAuth2 client and REST endpoints.
///
/// When `sync_enabled` is false, chat spaces, calendars and streams are kept
/// locally only and no Google API is called.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorization_uri: String,
    pub token_uri: String,
    pub revoke_uri: String,
    pub calendar_api_base: String,
    pub chat_api_base: String,
    pub youtube_api_base: String,
    pub sync_enabled: bool,
    /// Seconds a generated OAuth2 `state` stays valid
    pub state_ttl_secs: u64,
    /// HTTP timeout for Google calls in seconds
    pub request_timeout_secs: u64,
}

/// reCAPTCHA configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReCaptchaSettings {
    pub enabled: bool,
    pub secret: String,
    pub verify_uri: String,
    /// Minimum score accepted for v3 tokens
    pub minimum_score: f64,
    /// Failed attempts allowed before a client is blocked
    pub max_attempts: u32,
    /// Lifetime of an attempt window in seconds
    pub attempt_ttl_secs: u64,
    /// Maximum number of tracked clients
    pub max_tracked_clients: usize,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("jwt.access_token_expiry_minutes", 15)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("snowflake.machine_id", 1)?
            .set_default("snowflake.node_id", 0)?
            .set_default("rate_limit.enabled", true)?
            .set_default("rate_limit.api_requests_per_window", 120)?
            .set_default("rate_limit.auth_requests_per_window", 10)?
            .set_default("rate_limit.window_seconds", 60)?
            .set_default("cors.allowed_origins", vec!["http://localhost:4200"])?
            .set_default("google.client_id", "")?
            .set_default("google.client_secret", "")?
            .set_default("google.redirect_uri", "http://localhost:8080/api/oauth2/verify-authorization-code")?
            .set_default("google.authorization_uri", "https://accounts.google.com/o/oauth2/v2/auth")?
            .set_default("google.token_uri", "https://oauth2.googleapis.com/token")?
            .set_default("google.revoke_uri", "https://oauth2.googleapis.com/revoke")?
            .set_default("google.calendar_api_base", "https://www.googleapis.com/calendar/v3")?
            .set_default("google.chat_api_base", "https://chat.googleapis.com/v1")?
            .set_default("google.youtube_api_base", "https://www.googleapis.com/youtube/v3")?
            .set_default("google.sync_enabled", false)?
            .set_default("google.state_ttl_secs", 600)?
            .set_default("google.request_timeout_secs", 30)?
            .set_default("recaptcha.enabled", false)?
            .set_default("recaptcha.secret", "")?
            .set_default("recaptcha.verify_uri", "https://www.google.com/recaptcha/api/siteverify")?
            .set_default("recaptcha.minimum_score", 0.5)?
            .set_default("recaptcha.max_attempts", 4)?
            .set_default("recaptcha.attempt_ttl_secs", 4 * 60 * 60)?
            .set_default("recaptcha.max_tracked_clients", 10_000)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "snowflake.machine_id",
                std::env::var("SNOWFLAKE_MACHINE_ID").ok(),
            )?
            .set_override_option("google.client_id", std::env::var("GOOGLE_CLIENT_ID").ok())?
            .set_override_option(
                "google.client_secret",
                std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            )?
            .set_override_option("recaptcha.secret", std::env::var("RECAPTCHA_SECRET").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.validate()?;
                Ok(settings)
            })
    }

    /// Validate cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }
        if self.google.sync_enabled && self.google.client_id.is_empty() {
            return Err(ConfigError::Message(
                "google.client_id is required when google.sync_enabled is true".into(),
            ));
        }
        if self.recaptcha.enabled && self.recaptcha.secret.is_empty() {
            return Err(ConfigError::Message(
                "recaptcha.secret is required when recaptcha.enabled is true".into(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr_parses_host_and_port() {
        let server = ServerSettings {
            host: "127.0.0.1".into(),
            port: 8080,
        };
        let addr = server.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_socket_addr_rejects_hostname() {
        let server = ServerSettings {
            host: "not a host".into(),
            port: 8080,
        };
        assert!(server.socket_addr().is_err());
    }
}
