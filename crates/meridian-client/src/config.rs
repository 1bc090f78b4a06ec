//! Consumer configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::channel::CallOptions;

/// Error loading consumer configuration.
#[derive(Error, Debug)]
#[error("configuration error: {0}")]
pub struct ConfigError(String);

/// Consumer process configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Per-call timeout in milliseconds. Absent means no timeout.
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| ConfigError(format!("parsing {}: {e}", path.display())))
    }

    /// Converts the configuration into per-call options.
    #[must_use]
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            timeout: self.call_timeout_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.call_options().timeout, None);
    }

    #[test]
    fn timeout_parses_into_duration() {
        let config: ClientConfig = toml::from_str("call_timeout_ms = 1500").unwrap();
        assert_eq!(
            config.call_options().timeout,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<ClientConfig, _> = toml::from_str("call_timeout = 1500");
        assert!(result.is_err());
    }
}
