//! Daemon configuration.
//!
//! Configuration is read from a TOML file. Every field is optional:
//!
//! ```toml
//! bind_address = "0.0.0.0"
//! port = 5000
//! max_command_len = 1024
//! ```

use crate::protocol::DEFAULT_MAX_COMMAND_LEN;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "RESOURCE_DAEMON_CONFIG";

/// Port the daemon listens on when none is configured.
pub const DEFAULT_PORT: u16 = 5000;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub max_command_len: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
        }
    }
}

impl DaemonConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV`], or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_command_len == 0 {
            return Err(ConfigError::Invalid("max_command_len must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.max_command_len, 1024);
        assert_eq!(DaemonConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = DaemonConfig::from_toml_str("port = 5001").unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.bind_address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            DaemonConfig::from_toml_str("port = \"five\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DaemonConfig::from_toml_str("prot = 5000"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DaemonConfig::from_toml_str("max_command_len = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_address = \"0.0.0.0\"\nport = 6000\nmax_command_len = 512").unwrap();

        let config = DaemonConfig::load(file.path()).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:6000");
        assert_eq!(config.max_command_len, 512);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DaemonConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
