//! Response type exchanged over the REPL wire.

use serde::{Deserialize, Serialize};

/// Status of a REPL response.
///
/// This is a closed, versioned set: new members may only be appended, so the
/// wire discriminants of existing members never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// Command evaluated successfully.
    Ok,
    /// Command evaluation failed.
    Error,
    /// Command evaluation did not finish in time.
    Timeout,
    /// The peer did not recognize the command.
    UnknownCommand,
    /// The session should end after this response.
    Shutdown,
}

/// A response from the REPL peer. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplResponse {
    /// Outcome of the command.
    pub status: ResponseStatus,

    /// Payload text; present when the status carries one.
    pub value: Option<String>,
}

impl ReplResponse {
    /// Successful evaluation with a payload.
    pub fn ok(value: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            value: Some(value.into()),
        }
    }

    /// Failed evaluation with an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            value: Some(message.into()),
        }
    }

    /// Evaluation timed out.
    pub fn timeout() -> Self {
        Self {
            status: ResponseStatus::Timeout,
            value: None,
        }
    }

    /// The command was not recognized.
    pub fn unknown_command(name: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::UnknownCommand,
            value: Some(name.into()),
        }
    }

    /// End-of-session response.
    pub fn shutdown() -> Self {
        Self {
            status: ResponseStatus::Shutdown,
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_carries_value() {
        let response = ReplResponse::ok("3");
        assert_eq!(response.status, ResponseStatus::Ok);
        assert_eq!(response.value.as_deref(), Some("3"));
    }

    #[test]
    fn shutdown_response_has_no_value() {
        let response = ReplResponse::shutdown();
        assert_eq!(response.status, ResponseStatus::Shutdown);
        assert!(response.value.is_none());
    }
}
