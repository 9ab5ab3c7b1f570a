//! Service configuration.
//!
//! Everything is passed explicitly; nothing is read from the process
//! environment except the log filter override (`RUST_LOG`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default duplicate-submission window, in minutes.
pub const DEFAULT_DUPLICATE_WINDOW_MINUTES: i64 = 3;
/// Default access token lifetime, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
/// Default PBKDF2 work factor.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;
/// Smallest accepted PBKDF2 work factor.
pub const MIN_PBKDF2_ITERATIONS: u32 = 1_000;
/// Minimum signing secret length, in bytes.
pub const MIN_SECRET_KEY_BYTES: usize = 32;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntakeConfig {
    /// SQLite file; `None` keeps everything in memory
    pub database_path: Option<PathBuf>,
    /// How long a writer waits for the database lock
    pub busy_timeout_ms: u64,
    /// Window in which a second triage for the same patient is rejected
    pub duplicate_window_minutes: i64,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    pub auth: AuthConfig,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            busy_timeout_ms: 5_000,
            duplicate_window_minutes: DEFAULT_DUPLICATE_WINDOW_MINUTES,
            log_filter: "triage_intake_core=info".into(),
            auth: AuthConfig::default(),
        }
    }
}

impl IntakeConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.duplicate_window_minutes < 0 {
            return Err(ConfigError::Invalid(
                "duplicate_window_minutes must not be negative".into(),
            ));
        }
        self.auth.validate()
    }

    pub fn duplicate_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.duplicate_window_minutes)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Settings for password hashing and access tokens.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret. Required; there is no built-in fallback.
    pub secret_key: Option<String>,
    pub token_ttl_minutes: i64,
    pub pbkdf2_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("pbkdf2_iterations", &self.pbkdf2_iterations)
            .finish()
    }
}

impl AuthConfig {
    /// Config with the given secret and default everything else.
    pub fn with_secret(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: Some(secret_key.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        match &self.secret_key {
            None => {
                return Err(ConfigError::Invalid("auth.secret_key must be set".into()));
            }
            Some(key) if key.len() < MIN_SECRET_KEY_BYTES => {
                return Err(ConfigError::Invalid(format!(
                    "auth.secret_key must be at least {MIN_SECRET_KEY_BYTES} bytes"
                )));
            }
            Some(_) => {}
        }
        if self.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "auth.token_ttl_minutes must be positive".into(),
            ));
        }
        if self.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
            return Err(ConfigError::Invalid(format!(
                "auth.pbkdf2_iterations must be at least {MIN_PBKDF2_ITERATIONS}"
            )));
        }
        Ok(())
    }

    /// The signing secret; only call after [`AuthConfig::validate`].
    pub(crate) fn secret_bytes(&self) -> ConfigResult<&[u8]> {
        self.secret_key
            .as_deref()
            .map(str::as_bytes)
            .ok_or_else(|| ConfigError::Invalid("auth.secret_key must be set".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults() {
        let config = IntakeConfig::default();
        assert_eq!(config.duplicate_window(), chrono::Duration::minutes(3));
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.auth.token_ttl_minutes, 60);
    }

    #[test]
    fn test_secret_required() {
        let config = IntakeConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_short_secret_rejected() {
        let auth = AuthConfig::with_secret("too-short");
        assert!(auth.validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = IntakeConfig::from_json_str(&format!(
            r#"{{"duplicate_window_minutes": 5, "auth": {{"secret_key": "{SECRET}"}}}}"#
        ))
        .unwrap();
        assert_eq!(config.duplicate_window_minutes, 5);
        assert_eq!(config.auth.pbkdf2_iterations, DEFAULT_PBKDF2_ITERATIONS);
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_negative_window_rejected() {
        let result = IntakeConfig::from_json_str(&format!(
            r#"{{"duplicate_window_minutes": -1, "auth": {{"secret_key": "{SECRET}"}}}}"#
        ));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.json");
        std::fs::write(
            &path,
            format!(r#"{{"database_path": "intake.db", "auth": {{"secret_key": "{SECRET}"}}}}"#),
        )
        .unwrap();

        let config = IntakeConfig::load(&path).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("intake.db")));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = AuthConfig::with_secret(SECRET);
        assert!(!format!("{auth:?}").contains(SECRET));
    }
}
