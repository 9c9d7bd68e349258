//! repl-wire
//!
//! Transport core for a remote REPL: one socket per session, a binary wire
//! codec shared by both directions, and a reflective-invocation wrapper that
//! normalizes dynamic-dispatch failures into a closed set of error kinds.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod reflect;
pub mod transport;
