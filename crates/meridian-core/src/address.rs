//! Network address of a provider process.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a `"<host>:<port>"` address string.
#[derive(Error, Debug)]
pub enum AddressParseError {
    /// The string contained no colon separator.
    #[error("missing ':' separator in address: {0}")]
    MissingSeparator(String),

    /// The host part was empty.
    #[error("empty host in address: {0}")]
    EmptyHost(String),

    /// The port part was not a valid u16.
    #[error("invalid port in address {addr}: {port}")]
    InvalidPort { addr: String, port: String },
}

/// Address a provider listens on, as published to the discovery service.
///
/// The discovery-service value encoding is the `Display` form:
/// `"<host>:<port>"`, UTF-8, colon-delimited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderAddress {
    /// Hostname or IP address.
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl ProviderAddress {
    /// Creates an address from host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for ProviderAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| AddressParseError::MissingSeparator(s.to_owned()))?;

        if host.is_empty() {
            return Err(AddressParseError::EmptyHost(s.to_owned()));
        }

        let port = port.parse().map_err(|_| AddressParseError::InvalidPort {
            addr: s.to_owned(),
            port: port.to_owned(),
        })?;

        Ok(Self {
            host: host.to_owned(),
            port,
        })
    }
}
