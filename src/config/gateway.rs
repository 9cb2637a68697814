//! Gateway configuration: the WebSocket endpoint and connection tunables

use serde::Deserialize;
use std::time::Duration;

use crate::application::GatewaySettings;

use super::error::ConfigValidationError;

/// Gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Route the WebSocket upgrade is served on
    pub path: String,

    /// Frames queued per connection before pushes wait for the writer
    pub outbound_buffer: usize,

    /// Seconds between server pings
    pub ping_interval_secs: u64,

    /// Seconds without any inbound frame before the connection is dropped
    pub idle_timeout_secs: u64,

    /// Largest inbound text frame accepted
    pub max_frame_bytes: usize,

    /// Close the older connection when a user logs in again elsewhere
    pub close_superseded: bool,

    /// Longest chat message accepted, in characters
    pub message_max_len: usize,
}

impl GatewayConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// The subset of settings the gateway core needs
    pub fn settings(&self) -> GatewaySettings {
        GatewaySettings {
            close_superseded: self.close_superseded,
            max_frame_bytes: self.max_frame_bytes,
            message_max_len: self.message_max_len,
        }
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.path.starts_with('/') || self.path == "/health" {
            return Err(ConfigValidationError::InvalidGatewayPath);
        }
        let non_zero = [
            ("outbound_buffer", self.outbound_buffer as u64),
            ("ping_interval_secs", self.ping_interval_secs),
            ("idle_timeout_secs", self.idle_timeout_secs),
            ("max_frame_bytes", self.max_frame_bytes as u64),
            ("message_max_len", self.message_max_len as u64),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigValidationError::ZeroGatewaySetting(*name));
        }
        if self.idle_timeout_secs <= self.ping_interval_secs {
            return Err(ConfigValidationError::IdleTimeoutTooShort);
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let core = GatewaySettings::default();
        Self {
            path: "/".to_string(),
            outbound_buffer: 256,
            ping_interval_secs: 20,
            idle_timeout_secs: 120,
            max_frame_bytes: core.max_frame_bytes,
            close_superseded: core.close_superseded,
            message_max_len: core.message_max_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        assert_eq!(config.path, "/");
        assert_eq!(config.ping_interval(), Duration::from_secs(20));
        assert_eq!(config.idle_timeout(), Duration::from_secs(120));
        assert!(config.close_superseded);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_path_must_be_absolute() {
        let config = GatewayConfig {
            path: "ws".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidGatewayPath)
        );
    }

    #[test]
    fn test_path_cannot_shadow_health() {
        let config = GatewayConfig {
            path: "/health".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidGatewayPath)
        );
    }

    #[test]
    fn test_zero_buffer_is_rejected() {
        let config = GatewayConfig {
            outbound_buffer: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroGatewaySetting("outbound_buffer"))
        );
    }

    #[test]
    fn test_idle_timeout_must_exceed_ping_interval() {
        let config = GatewayConfig {
            ping_interval_secs: 30,
            idle_timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::IdleTimeoutTooShort)
        );
    }

    #[test]
    fn test_settings_carry_core_values() {
        let config = GatewayConfig {
            close_superseded: false,
            message_max_len: 10,
            ..Default::default()
        };
        let settings = config.settings();
        assert!(!settings.close_superseded);
        assert_eq!(settings.message_max_len, 10);
    }
}
