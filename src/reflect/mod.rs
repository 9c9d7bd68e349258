//! Reflective-call error normalization.
//!
//! Dynamic construction and invocation (plugin loading, symbol lookup) can
//! fail for many distinct reasons. This module collapses them into the
//! closed set of [`MisconfigurationKind`] codes so callers never see the
//! dispatch mechanism's own failures directly.
//!
//! [`MisconfigurationKind`]: crate::error::MisconfigurationKind

mod invoker;
mod search_path;

pub use invoker::{ReflectiveFailure, ReflectiveInvoker, TargetFailure};
pub use search_path::{
    search_path_diagnostic, EnvSearchPath, FixedRoots, ResolutionScope, SEARCH_PATH_UNAVAILABLE,
};
