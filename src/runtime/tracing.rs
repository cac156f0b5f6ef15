//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for the daemon with the
//! `tracing` crate.
//!
//! ## Configuration
//!
//! Log lines use the compact format without the module prefix
//! (`with_target(false)`); the structured fields (`resource`, `property`,
//! `code`, `port`, `peer`) carry the context instead.
//!
//! ## Levels
//!
//! - `debug` - command payloads and resolved URIs
//! - `info` - completed state changes (created, updated, deleted, listening)
//! - `warn` - rejected operations
//! - `error` - capability refusals and protocol errors
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=resource_daemon::protocol=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a create/read session looks like:
//!
//! ```text
//! INFO Listening for commands addr=127.0.0.1:5000 port=5000
//! INFO Created resource="pipelines" child="p0"
//! INFO Command completed verb=CREATE uri="/pipelines"
//! WARN Serialize failed property="bogus" target="p0" error=No such resource: bogus
//! ```

/// Initializes the global subscriber. Filtering follows `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
