//! Listener address and logging settings

use serde::Deserialize;
use std::net::SocketAddr;

use super::error::ConfigValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            environment: Environment::default(),
            log_level: "info,twaddle_gateway=debug,sqlx=warn".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigValidationError::InvalidAddress(self.host.clone()))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Production always logs JSON, whatever `log_format` says.
    pub fn json_logs(&self) -> bool {
        self.log_format == LogFormat::Json || self.is_production()
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }
        self.socket_addr().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listens_on_all_interfaces_by_default() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8888");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unparseable_host_or_zero_port_is_rejected() {
        let bad_host = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        let zero_port = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(
            bad_host.validate(),
            Err(ConfigValidationError::InvalidAddress(_))
        ));
        assert_eq!(zero_port.validate(), Err(ConfigValidationError::InvalidPort));
    }

    #[test]
    fn production_forces_json_logs() {
        let mut config = ServerConfig::default();
        assert!(!config.json_logs());

        config.log_format = LogFormat::Json;
        assert!(config.json_logs());

        config.log_format = LogFormat::Pretty;
        config.environment = Environment::Production;
        assert!(config.json_logs());
    }
}
