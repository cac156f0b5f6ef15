//! # Resource Daemon
//!
//! > **Uniform remote CRUD over a tree of introspectable resources.**
//!
//! This crate serves a tree of named resources over a small text protocol on
//! TCP. Every resource is reached by a slash path and answers the same four
//! verbs, `CREATE`, `READ`, `UPDATE` and `DELETE`, whatever it actually is.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One resource type, many kinds
//! There is a single [`Resource`](framework::Resource) type. What a resource
//! *is* lives in its [`ResourceKind`](framework::ResourceKind): a table of
//! typed, access-controlled properties plus a Creator and a Deleter. Adding a
//! kind never touches the dispatch code.
//!
//! ### Results, not flags
//! Single operations return `Result<T, ResourceError>`. Multi-property reads
//! and updates return a [`Batch`](framework::Batch) of per-item outcomes that
//! stops at the first failure and keeps what succeeded before it.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Resources, property tables, capabilities and the property reflector.
//!
//! ### 2. The Address Book ([`directory`])
//! Resolves URIs such as `/pipelines/p0/state` to a resource and an optional
//! property.
//!
//! ### 3. The Wire ([`protocol`])
//! Parses `VERB URI ARGS`, dispatches and answers with a JSON envelope:
//!
//! ```text
//! > READ /pipelines/p0/state
//! < {"code":"OK","description":"Success","response":{"name":"state","value":"\"null\"",...}}
//! ```
//!
//! ### 4. The Kinds ([`pipeline`])
//! The `pipelines` collection and `pipeline` kinds served by the daemon.
//!
//! ### 5. The Orchestrator ([`runtime`])
//! Configuration, logging setup and the [`Daemon`](runtime::Daemon) that wires
//! everything together.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! printf 'CREATE /pipelines p0 videotestsrc ! fakesink' | nc -q1 127.0.0.1 5000
//! ```

pub mod directory;
pub mod framework;
pub mod pipeline;
pub mod protocol;
pub mod runtime;
