//! PostgreSQL pool settings, read only when `storage.backend = "postgres"`

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ConfigValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL; required for the postgres backend
    pub url: String,

    pub min_connections: u32,
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection before a query fails
    pub connect_timeout_secs: u64,

    /// Apply the embedded migrations before serving
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 1,
            max_connections: 10,
            connect_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Pool builder carrying these settings; the caller connects it.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout())
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired("database.url"));
        }
        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(ConfigValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ConfigValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn url_is_the_only_required_setting() {
        assert_eq!(
            DatabaseConfig::default().validate(),
            Err(ConfigValidationError::MissingRequired("database.url"))
        );
        assert!(with_url("postgres://chat@localhost/twaddle").validate().is_ok());
        assert!(with_url("postgresql://chat@localhost/twaddle").validate().is_ok());
    }

    #[test]
    fn non_postgres_url_is_rejected() {
        assert_eq!(
            with_url("mysql://localhost/twaddle").validate(),
            Err(ConfigValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn pool_bounds_must_be_ordered_and_non_empty() {
        let inverted = DatabaseConfig {
            min_connections: 4,
            max_connections: 2,
            ..with_url("postgres://localhost/twaddle")
        };
        let empty = DatabaseConfig {
            min_connections: 0,
            max_connections: 0,
            ..with_url("postgres://localhost/twaddle")
        };
        assert_eq!(inverted.validate(), Err(ConfigValidationError::InvalidPoolSize));
        assert_eq!(empty.validate(), Err(ConfigValidationError::InvalidPoolSize));
    }

    #[test]
    fn pool_options_use_configured_bounds() {
        let config = DatabaseConfig {
            max_connections: 3,
            connect_timeout_secs: 9,
            ..with_url("postgres://localhost/twaddle")
        };
        let options = config.pool_options();
        assert_eq!(options.get_max_connections(), 3);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(9));
    }
}
