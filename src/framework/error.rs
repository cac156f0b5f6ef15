//! # Framework Errors
//!
//! Every CRUD entry point in the framework reports its outcome through the
//! types in this module:
//!
//! - [`ResourceError`] is the failure half of a single-operation `Result`.
//! - [`ReturnCode`] is the full outcome domain (including `OK`) stored as a
//!   resource's last result and reported on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the most recently completed operation on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnCode {
    #[default]
    Ok,
    NullArgument,
    NoResource,
    NoCreate,
    NoRead,
    NoUpdate,
    NoDelete,
    NoConnection,
}

impl ReturnCode {
    /// Wire name of the code (e.g. `NO_RESOURCE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NullArgument => "NULL_ARGUMENT",
            Self::NoResource => "NO_RESOURCE",
            Self::NoCreate => "NO_CREATE",
            Self::NoRead => "NO_READ",
            Self::NoUpdate => "NO_UPDATE",
            Self::NoDelete => "NO_DELETE",
            Self::NoConnection => "NO_CONNECTION",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T> From<&Result<T, ResourceError>> for ReturnCode {
    fn from(result: &Result<T, ResourceError>) -> Self {
        match result {
            Ok(_) => ReturnCode::Ok,
            Err(e) => e.code(),
        }
    }
}

/// Errors returned by resources, property reflectors and capabilities.
///
/// Each variant carries the name it failed on so log lines and client replies
/// can say *what* was missing, not only that something was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("Missing required argument: {0}")]
    NullArgument(String),
    #[error("No such resource: {0}")]
    NoResource(String),
    #[error("Cannot create {0}")]
    NoCreate(String),
    #[error("Cannot read {0}")]
    NoRead(String),
    #[error("Cannot update {0}")]
    NoUpdate(String),
    #[error("Cannot delete {0}")]
    NoDelete(String),
    #[error("Connection failed: {0}")]
    NoConnection(String),
}

impl ResourceError {
    pub fn code(&self) -> ReturnCode {
        match self {
            Self::NullArgument(_) => ReturnCode::NullArgument,
            Self::NoResource(_) => ReturnCode::NoResource,
            Self::NoCreate(_) => ReturnCode::NoCreate,
            Self::NoRead(_) => ReturnCode::NoRead,
            Self::NoUpdate(_) => ReturnCode::NoUpdate,
            Self::NoDelete(_) => ReturnCode::NoDelete,
            Self::NoConnection(_) => ReturnCode::NoConnection,
        }
    }
}

/// Convenience alias used across the framework.
pub type ResourceResult<T> = Result<T, ResourceError>;
