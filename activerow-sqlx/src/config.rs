//! Connection settings for [`SqlxDatabase`](crate::SqlxDatabase).

use serde::Deserialize;

/// Environment variable read by [`DatabaseConfig::from_env`].
pub const DATABASE_URL: &str = "DATABASE_URL";

/// Where the database lives.
///
/// `Deserialize`, so it can be embedded in a larger application config:
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct AppConfig {
///     database: DatabaseConfig,
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Read `DATABASE_URL`, after loading a `.env` file if there is one.
    ///
    /// `.env` never overrides variables already set in the process.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(DATABASE_URL) {
            Some(url) if !url.trim().is_empty() => Ok(Self { url }),
            _ => Err(ConfigError::Missing(DATABASE_URL)),
        }
    }
}

/// Errors that can occur while resolving a [`DatabaseConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is unset or blank.
    Missing(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Config key not found: {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}
