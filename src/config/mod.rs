//! Configuration for the REPL listener.

mod settings;

pub use settings::*;
