//! Error types for the REPL transport and reflective invoker.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
