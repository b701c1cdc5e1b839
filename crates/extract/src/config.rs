use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the model host, as read from configuration.
///
/// `port` is kept wide so that out-of-range values reach [`ModelConfig::endpoint`]
/// instead of failing during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub host: String,
    pub port: u32,
    pub temperature: f64,
    pub model_id: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 54256,
            temperature: 0.1,
            model_id: "qwen3:32b".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Validated form of [`ModelConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEndpoint {
    pub base_url: String,
    pub model_id: String,
    pub temperature: f64,
    pub timeout: Option<Duration>,
}

impl ModelConfig {
    pub fn endpoint(&self) -> Result<ModelEndpoint, ConfigError> {
        let port = u16::try_from(self.port).map_err(|_| ConfigError::PortOutOfRange(self.port))?;

        // NaN fails the range check too
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.temperature));
        }

        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        Ok(ModelEndpoint {
            base_url: format!("http://{}:{}", host, port),
            model_id: self.model_id.clone(),
            temperature: self.temperature,
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let endpoint = ModelConfig::default().endpoint().unwrap();
        assert_eq!(endpoint.base_url, "http://localhost:54256");
        assert_eq!(endpoint.model_id, "qwen3:32b");
        assert_eq!(endpoint.temperature, 0.1);
        assert_eq!(endpoint.timeout, None);
    }

    #[test]
    fn test_rejects_port_outside_16_bits() {
        let config = ModelConfig {
            port: 65536,
            ..Default::default()
        };
        assert_eq!(config.endpoint(), Err(ConfigError::PortOutOfRange(65536)));

        let config = ModelConfig {
            port: 65535,
            ..Default::default()
        };
        assert!(config.endpoint().is_ok());
    }

    #[test]
    fn test_rejects_temperature_outside_unit_range() {
        for temperature in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
            let config = ModelConfig {
                temperature,
                ..Default::default()
            };
            assert!(matches!(
                config.endpoint(),
                Err(ConfigError::TemperatureOutOfRange(_))
            ));
        }

        for temperature in [0.0, 1.0] {
            let config = ModelConfig {
                temperature,
                ..Default::default()
            };
            assert!(config.endpoint().is_ok());
        }
    }

    #[test]
    fn test_rejects_blank_host() {
        let config = ModelConfig {
            host: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), Err(ConfigError::EmptyHost));
    }

    #[test]
    fn test_timeout_is_optional() {
        let config = ModelConfig {
            request_timeout_secs: Some(30),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint().unwrap().timeout,
            Some(Duration::from_secs(30))
        );
    }
}
