//! Provider configuration.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "meridian.toml";

/// Provider process configuration.
///
/// Loaded from a TOML file, with `MERIDIAN_HOST` / `MERIDIAN_PORT`
/// environment variables taking precedence over the file. `port = 0`
/// binds an ephemeral port; the advertised address picks up whatever the
/// kernel assigned.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Address the listener binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the listener binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address published to discovery, when it differs from the bind
    /// address (e.g. binding `0.0.0.0` but advertising a routable IP).
    #[serde(default)]
    pub advertised_host: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            advertised_host: None,
        }
    }
}

impl ProviderConfig {
    /// Loads configuration from `meridian.toml` if present, then applies
    /// environment overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self, ProviderError> {
        let mut config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::load_from(DEFAULT_CONFIG_FILE)?
        } else {
            debug!(file = DEFAULT_CONFIG_FILE, "no config file, using defaults");
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Loads configuration from a specific TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::Config(format!("reading {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| ProviderError::Config(format!("parsing {}: {e}", path.display())))
    }

    fn apply_env(&mut self) -> Result<(), ProviderError> {
        if let Ok(host) = std::env::var("MERIDIAN_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("MERIDIAN_PORT") {
            self.port = port
                .parse()
                .map_err(|_| ProviderError::Config(format!("invalid MERIDIAN_PORT: {port}")))?;
        }
        Ok(())
    }

    /// The host to publish to discovery.
    #[must_use]
    pub fn advertised_host(&self) -> &str {
        self.advertised_host.as_deref().unwrap_or(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.advertised_host(), "127.0.0.1");
    }

    #[test]
    fn parses_full_file() {
        let config: ProviderConfig = toml::from_str(
            r#"
            host = "0.0.0.0"
            port = 9100
            advertised_host = "10.1.2.3"
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9100);
        assert_eq!(config.advertised_host(), "10.1.2.3");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: ProviderConfig = toml::from_str(r#"port = 7000"#).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<ProviderConfig, _> = toml::from_str(r#"prot = 7000"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ProviderConfig::load_from("/nonexistent/meridian.toml").unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }
}
