//! Server configuration.
//!
//! Network parameters for the HTTP/WebSocket listener. The port is the only
//! value read from the environment.
use std::env;
use thiserror::Error;

/// Environment variable holding the listening port.
pub const PORT_ENV_VAR: &str = "PORT";

/// Port used when `PORT` is unset (local development).
pub const DEFAULT_PORT: u16 = 8080;

/// Interface the server binds to.
pub const BIND_HOST: &str = "0.0.0.0";

/// Path serving the game protocol.
pub const WS_PATH: &str = "/ws";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for `PORT`: {0:?}")]
    InvalidPort(String),
}

/// Resolved listener settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_port_var(env::var(PORT_ENV_VAR).ok().as_deref())
    }

    /// Build the configuration from a raw `PORT` value, falling back to
    /// [`DEFAULT_PORT`] when it is missing or blank.
    pub fn from_port_var(raw: Option<&str>) -> Result<Self, ConfigError> {
        let port = match raw.map(str::trim) {
            None | Some("") => DEFAULT_PORT,
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort(value.to_string()))?,
        };
        Ok(Self {
            host: BIND_HOST.to_string(),
            port,
        })
    }
}
