//! Store connection configuration.
//!
//! Connection parameters come from the environment (`PG_HOST`, `PG_PORT`,
//! `PG_DB`, `PG_USER`, `PG_PASSWORD`), resolved once at startup. Missing
//! required values are startup errors, never per-call errors.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use thiserror::Error;

use rentaldesk_core::ToolError;

/// Configuration failure at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Postgres connection parameters.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Connection pool cap; tool calls queue on the pool beyond this.
    pub max_connections: u32,
}

impl StoreConfig {
    /// Read configuration from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = require("PG_HOST")?;
        let database = require("PG_DB")?;
        let password = require("PG_PASSWORD")?;

        let port = match std::env::var("PG_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PG_PORT",
                value: raw,
            })?,
            Err(_) => 5432,
        };

        let user = std::env::var("PG_USER").unwrap_or_else(|_| "postgres".to_string());

        Ok(Self {
            host,
            port,
            database,
            user,
            password,
            max_connections: 5,
        })
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }

    /// Open the connection pool. A failure here is `StoreUnavailable`: the
    /// process can start anyway and report it per call, or refuse to start.
    pub async fn connect(&self) -> Result<PgPool, ToolError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(self.connect_options())
            .await
            .map_err(|e| ToolError::store_unavailable(format!("failed to connect: {e}")))
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_host_is_a_config_error() {
        // Isolate from the ambient environment by checking the error type on
        // a name that is never set in CI.
        let err = require("RENTALDESK_TEST_UNSET_VAR").unwrap_err();
        assert_eq!(err, ConfigError::Missing("RENTALDESK_TEST_UNSET_VAR"));
    }
}
