//! Search-path diagnostics for type-resolution failures.

use std::path::PathBuf;

/// Marker used when no scope in the chain can report its roots.
pub const SEARCH_PATH_UNAVAILABLE: &str = "search path unavailable";

/// One scope in the ordered resolution chain.
///
/// A scope may or may not be able to report the roots it searches; the
/// diagnostic walks the chain and uses the first one that can.
pub trait ResolutionScope: Send + Sync {
    /// The roots this scope consults, if it can report them.
    fn search_roots(&self) -> Option<Vec<PathBuf>>;
}

/// Scope with an explicit, known list of roots.
pub struct FixedRoots {
    roots: Vec<PathBuf>,
}

impl FixedRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl ResolutionScope for FixedRoots {
    fn search_roots(&self) -> Option<Vec<PathBuf>> {
        Some(self.roots.clone())
    }
}

/// Scope backed by a path-list environment variable.
///
/// Reports nothing when the variable is unset or empty, letting the chain
/// fall through to the next scope.
pub struct EnvSearchPath {
    var: String,
}

impl EnvSearchPath {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl ResolutionScope for EnvSearchPath {
    fn search_roots(&self) -> Option<Vec<PathBuf>> {
        let value = std::env::var(&self.var).ok()?;
        if value.is_empty() {
            return None;
        }
        Some(std::env::split_paths(&value).collect())
    }
}

/// Render the effective search path for a type-resolution failure.
///
/// Walks `scopes` in order and formats the roots of the first scope able to
/// report them, one per line with a two-space indent. Never fails: when no
/// scope reports, the fixed [`SEARCH_PATH_UNAVAILABLE`] marker is returned.
pub fn search_path_diagnostic(scopes: &[Box<dyn ResolutionScope>]) -> String {
    for scope in scopes {
        if let Some(roots) = scope.search_roots() {
            let listing = roots
                .iter()
                .map(|root| root.display().to_string())
                .collect::<Vec<_>>()
                .join("\n  ");
            return format!("  {listing}\n");
        }
    }
    SEARCH_PATH_UNAVAILABLE.to_string()
}
