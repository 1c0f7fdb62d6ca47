//! Configuration module for RecipeBox.

use serde::Deserialize;
use std::path::Path;

use crate::{RecipeBoxError, Result};

/// Signing key used when none is configured. Refused in production.
pub const DEV_SECRET_KEY: &str = "dev-only-secret";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    ///
    /// Only enable behind a reverse proxy that overwrites these headers,
    /// otherwise clients can pick their own address and dodge the
    /// brute-force guard.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_forwarded_for: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/recipebox.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/recipebox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development over plain HTTP.
    #[default]
    Dev,
    /// Production behind TLS.
    Prod,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(format!("unknown environment: {s}")),
        }
    }
}

/// Session and token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Deployment environment; controls the cookie `Secure` flag.
    #[serde(default)]
    pub environment: Environment,
    /// HMAC signing key for session tokens.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Session token lifetime in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_secret_key() -> String {
    DEV_SECRET_KEY.to_string()
}

fn default_access_token_expiry() -> u64 {
    3600 // 60 minutes
}

fn default_cookie_name() -> String {
    "access_token".to_string()
}

impl AuthConfig {
    /// Whether the session cookie must carry the `Secure` flag.
    pub fn cookie_secure(&self) -> bool {
        self.environment == Environment::Prod
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            secret_key: default_secret_key(),
            access_token_expiry_secs: default_access_token_expiry(),
            cookie_name: default_cookie_name(),
        }
    }
}

/// Brute-force guard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// Failed logins from one address that trigger a block.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    /// Trailing window over which failures are counted, in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    300 // 5 minutes
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

/// Audit log configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Maximum number of records returned by the admin log listings.
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

fn default_list_limit() -> u32 {
    200
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

/// Recipe image upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Directory where uploaded images are written.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// URL prefix under which stored images are served.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "data/uploads".to_string()
}

fn default_public_prefix() -> String {
    "/static/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    5
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            public_prefix: default_public_prefix(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Initial super administrator created at startup if missing.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BootstrapConfig {
    /// Username of the bootstrap account.
    #[serde(default)]
    pub admin_username: Option<String>,
    /// Plaintext password of the bootstrap account.
    #[serde(default)]
    pub admin_password: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Session configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Brute-force guard configuration.
    #[serde(default)]
    pub guard: GuardConfig,
    /// Audit log configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Image upload configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Bootstrap account.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RecipeBoxError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RecipeBoxError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `RECIPEBOX_SECRET_KEY`: session signing key
    /// - `RECIPEBOX_ENV`: `dev` or `prod`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("RECIPEBOX_SECRET_KEY") {
            if !secret.is_empty() {
                self.auth.secret_key = secret;
            }
        }
        if let Ok(env) = std::env::var("RECIPEBOX_ENV") {
            match env.parse() {
                Ok(environment) => self.auth.environment = environment,
                Err(e) => tracing::warn!("Ignoring RECIPEBOX_ENV: {}", e),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.auth.secret_key.is_empty() {
            return Err(RecipeBoxError::Config("auth.secret_key is empty".to_string()));
        }
        if self.auth.environment == Environment::Prod && self.auth.secret_key == DEV_SECRET_KEY {
            return Err(RecipeBoxError::Config(
                "auth.secret_key must be changed in production. \
                 Set it in config.toml or via RECIPEBOX_SECRET_KEY."
                    .to_string(),
            ));
        }
        if self.auth.access_token_expiry_secs == 0 {
            return Err(RecipeBoxError::Config(
                "auth.access_token_expiry_secs must be positive".to_string(),
            ));
        }
        if self.guard.max_failed_attempts == 0 {
            return Err(RecipeBoxError::Config(
                "guard.max_failed_attempts must be positive".to_string(),
            ));
        }
        let prefix = self.uploads.public_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') || prefix.len() < 2 {
            return Err(RecipeBoxError::Config(
                "uploads.public_prefix must be an absolute path below the root".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert!(!config.server.trust_forwarded_for);

        assert_eq!(config.database.path, "data/recipebox.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/recipebox.log");

        assert_eq!(config.auth.environment, Environment::Dev);
        assert_eq!(config.auth.secret_key, DEV_SECRET_KEY);
        assert_eq!(config.auth.access_token_expiry_secs, 3600);
        assert_eq!(config.auth.cookie_name, "access_token");
        assert!(!config.auth.cookie_secure());

        assert_eq!(config.guard.max_failed_attempts, 5);
        assert_eq!(config.guard.window_secs, 300);

        assert_eq!(config.audit.list_limit, 200);

        assert_eq!(config.uploads.storage_path, "data/uploads");
        assert_eq!(config.uploads.public_prefix, "/static/uploads");
        assert_eq!(config.uploads.max_upload_size_mb, 5);

        assert!(config.bootstrap.admin_username.is_none());
        assert!(config.bootstrap.admin_password.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 3000
trust_forwarded_for = true

[database]
path = "custom/db.sqlite"

[logging]
level = "debug"
file = "custom/app.log"

[auth]
environment = "prod"
secret_key = "prod-secret"
access_token_expiry_secs = 600
cookie_name = "sid"

[guard]
max_failed_attempts = 3
window_secs = 60

[audit]
list_limit = 50

[uploads]
storage_path = "custom/uploads"
public_prefix = "/media"
max_upload_size_mb = 2

[bootstrap]
admin_username = "root"
admin_password = "change-me-now"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.trust_forwarded_for);
        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.auth.environment, Environment::Prod);
        assert_eq!(config.auth.secret_key, "prod-secret");
        assert_eq!(config.auth.access_token_expiry_secs, 600);
        assert_eq!(config.auth.cookie_name, "sid");
        assert!(config.auth.cookie_secure());
        assert_eq!(config.guard.max_failed_attempts, 3);
        assert_eq!(config.guard.window_secs, 60);
        assert_eq!(config.audit.list_limit, 50);
        assert_eq!(config.uploads.public_prefix, "/media");
        assert_eq!(config.bootstrap.admin_username.as_deref(), Some("root"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.guard.max_failed_attempts, 5);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");
        assert!(matches!(result, Err(RecipeBoxError::Config(msg)) if msg.contains("config parse error")));
    }

    #[test]
    fn test_parse_unknown_environment() {
        let result = Config::parse("[auth]\nenvironment = \"staging\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(RecipeBoxError::Io(_))));
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let original_secret = std::env::var("RECIPEBOX_SECRET_KEY").ok();
        let original_env = std::env::var("RECIPEBOX_ENV").ok();

        std::env::set_var("RECIPEBOX_SECRET_KEY", "env-secret-key");
        std::env::set_var("RECIPEBOX_ENV", "prod");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.auth.secret_key, "env-secret-key");
        assert_eq!(config.auth.environment, Environment::Prod);

        match original_secret {
            Some(val) => std::env::set_var("RECIPEBOX_SECRET_KEY", val),
            None => std::env::remove_var("RECIPEBOX_SECRET_KEY"),
        }
        match original_env {
            Some(val) => std::env::set_var("RECIPEBOX_ENV", val),
            None => std::env::remove_var("RECIPEBOX_ENV"),
        }
    }

    #[test]
    fn test_validate_dev_default_secret_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_prod_default_secret_rejected() {
        let mut config = Config::default();
        config.auth.environment = Environment::Prod;

        let result = config.validate();
        assert!(matches!(result, Err(RecipeBoxError::Config(msg)) if msg.contains("secret_key")));
    }

    #[test]
    fn test_validate_empty_secret_rejected() {
        let mut config = Config::default();
        config.auth.secret_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_threshold_rejected() {
        let mut config = Config::default();
        config.guard.max_failed_attempts = 0;
        assert!(config.validate().is_err());
    }
}
