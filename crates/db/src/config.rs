use std::time::Duration;

/// Database configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Postgres connection string (required).
    pub database_url: String,
    /// Pool size (default: `20`).
    pub max_connections: u32,
    /// How long to wait for a pooled connection (default: `5` seconds).
    pub acquire_timeout: Duration,
}

/// Missing or malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl DbConfig {
    /// Load configuration from environment variables, reading `.env` first
    /// when present.
    ///
    /// | Env Var                   | Default    |
    /// |---------------------------|------------|
    /// | `DATABASE_URL`            | (required) |
    /// | `DB_MAX_CONNECTIONS`      | `20`       |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let max_connections = parse_var("DB_MAX_CONNECTIONS", 20u32, "u32")?;
        let acquire_secs = parse_var("DB_ACQUIRE_TIMEOUT_SECS", 5u64, "u64")?;

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_secs),
        })
    }

    /// Configuration with defaults for everything except the URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 20,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}
