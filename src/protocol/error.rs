//! Error types for the command protocol.

use crate::framework::ResourceError;
use thiserror::Error;

/// Errors a single command can end with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The line does not have the `VERB URI ARGS` shape, or ARGS do not fit
    /// the verb.
    #[error("Malformed command: {0}")]
    Malformed(String),

    /// The verb is none of CREATE, READ, UPDATE or DELETE.
    #[error("Unknown command: {0}")]
    UnknownVerb(String),

    /// The addressed resource rejected the operation.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The command did not run to completion.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Returns the code reported in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) | Self::UnknownVerb(_) => "BAD_COMMAND",
            Self::Resource(e) => e.code().as_str(),
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CommandError::UnknownVerb("FROBNICATE".into()).code(), "BAD_COMMAND");
        assert_eq!(CommandError::Malformed("".into()).code(), "BAD_COMMAND");
        let err: CommandError = ResourceError::NoResource("/pipelines/p9".into()).into();
        assert_eq!(err.code(), "NO_RESOURCE");
        assert_eq!(CommandError::Internal("task panicked".into()).code(), "INTERNAL_ERROR");
    }
}
