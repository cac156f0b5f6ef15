//! Runtime orchestration and lifecycle management.
//!
//! - [`Daemon`] - Builds the resource tree and owns the front end
//! - [`DaemonConfig`] - Configuration loaded from TOML
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod config;
pub mod daemon;
pub mod tracing;

pub use config::{ConfigError, DaemonConfig};
pub use daemon::Daemon;
pub use self::tracing::setup_tracing;
