use crate::{env_optional, env_parse, ConfigError};
use std::time::Duration;

/// MySQL connection settings. The relational backend is disabled when
/// `MYSQL_URL` is not set.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            acquire_timeout: Duration::from_secs(8),
        }
    }

    /// Reads `MYSQL_URL` and `MYSQL_ACQUIRE_TIMEOUT_SECS` (default 8).
    pub fn from_env_optional() -> Result<Option<Self>, ConfigError> {
        let Some(url) = env_optional("MYSQL_URL") else {
            return Ok(None);
        };
        let secs = env_parse("MYSQL_ACQUIRE_TIMEOUT_SECS", 8u64)?;
        Ok(Some(Self {
            url,
            acquire_timeout: Duration::from_secs(secs),
        }))
    }
}
