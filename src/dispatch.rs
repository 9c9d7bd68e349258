//! Command dispatcher boundary.

use crate::protocol::ReplResponse;

/// The evaluator seam of the transport.
///
/// The transport hands each received command string to a dispatcher and
/// sends back whatever response it produces. Command parsing, evaluation,
/// and the meaning of the payload all live behind this trait.
///
/// Dispatch runs on the blocking pool, so implementations may perform
/// synchronous work.
///
/// # Example
///
/// ```ignore
/// pub struct Echo;
///
/// impl CommandDispatcher for Echo {
///     fn dispatch(&self, command: &str) -> ReplResponse {
///         ReplResponse::ok(command)
///     }
/// }
/// ```
pub trait CommandDispatcher: Send + Sync {
    /// Evaluate one command and produce the response to send back.
    ///
    /// Returning a response with [`ResponseStatus::Shutdown`] ends the
    /// session after the response is sent.
    ///
    /// [`ResponseStatus::Shutdown`]: crate::protocol::ResponseStatus::Shutdown
    fn dispatch(&self, command: &str) -> ReplResponse;
}
