//! Text command protocol.
//!
//! - [`command`] - Parsing of `VERB URI ARGS` lines
//! - [`handler`] - Dispatch of a parsed command to a resolved resource
//! - [`response`] - The JSON envelope written back to the client
//! - [`front_end`] - The TCP listener state machine

pub mod command;
pub mod error;
pub mod front_end;
pub mod handler;
pub mod response;

pub use command::{Command, Verb};
pub use error::CommandError;
pub use front_end::{FrontEnd, FrontEndState, DEFAULT_MAX_COMMAND_LEN};
pub use handler::{CommandHandler, CommandService};
pub use response::Response;
