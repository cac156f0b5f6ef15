//! Response envelope written back for every command.

use super::error::CommandError;
use crate::framework::ReturnCode;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One reply: a JSON object followed by a newline on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: String,
    pub description: String,
    pub response: Option<JsonValue>,
}

impl Response {
    pub fn success(response: Option<JsonValue>) -> Self {
        Self {
            code: ReturnCode::Ok.as_str().to_string(),
            description: "Success".to_string(),
            response,
        }
    }

    pub fn error(error: &CommandError) -> Self {
        Self {
            code: error.code().to_string(),
            description: error.to_string(),
            response: None,
        }
    }

    /// An error that still carries the partial result of a batch.
    pub fn partial(error: &CommandError, response: JsonValue) -> Self {
        Self {
            response: Some(response),
            ..Self::error(error)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ReturnCode::Ok.as_str()
    }

    /// Serializes the envelope as a single newline terminated line.
    pub fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"code":"BAD_COMMAND","description":"Unable to encode response: {e}","response":null}}"#
            )
        });
        line.push('\n');
        line
    }
}
