//! Socket transport module.
//!
//! One session per connection: a session owns its socket, its encoder, and
//! its decoder for its whole lifetime, and serves exactly one command at a
//! time. Sessions share no mutable state.

mod listener;
mod session;

pub use listener::{ReplListener, SessionMetrics};
pub use session::{handle_session, ReplTransport};
