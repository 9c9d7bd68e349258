//! Normalization of reflective-call failures.

use std::any::Any;

use crate::error::{Cause, MisconfigurationKind, ReplError, ReplResult};

use super::search_path::{search_path_diagnostic, ResolutionScope};

/// Tagged cause reported by a dynamic construction or invocation.
///
/// The dispatch mechanism sits behind this narrow seam: it performs the
/// lookup or call and reports which of the known shapes went wrong, keeping
/// the invoker decoupled from how dispatch actually happens.
#[derive(Debug)]
pub enum ReflectiveFailure {
    /// Construction could not produce an instance.
    Instantiation { type_name: String, source: Cause },
    /// Requested method or constructor signature not found.
    NoSuchMethod { signature: String, source: Cause },
    /// Requested field not found.
    NoSuchField { name: String, source: Cause },
    /// Access to the member was denied.
    IllegalAccess { member: String, source: Cause },
    /// The type itself could not be resolved.
    ClassNotFound { type_name: String, source: Cause },
    /// The call reached the target, and the target itself failed.
    Target(TargetFailure),
}

/// How invoked target code failed.
#[derive(Debug)]
pub enum TargetFailure {
    /// Unrecoverable runtime fault (a captured panic payload).
    Fatal(Box<dyn Any + Send>),
    /// Ordinary unchecked failure.
    Unchecked(Cause),
    /// Expected, recoverable failure of the invoked code.
    Checked(Cause),
}

/// Wraps reflective operations and normalizes their failures.
///
/// The resolution scopes are consulted only on the class-not-found path, to
/// build the search-path diagnostic.
pub struct ReflectiveInvoker {
    scopes: Vec<Box<dyn ResolutionScope>>,
}

impl ReflectiveInvoker {
    pub fn new(scopes: Vec<Box<dyn ResolutionScope>>) -> Self {
        Self { scopes }
    }

    /// Run a reflective operation, normalizing any failure.
    ///
    /// On success the result is returned untouched. On failure the cause is
    /// classified into exactly one [`MisconfigurationKind`], except for
    /// target failures:
    ///
    /// - a fatal target fault resumes unwinding with the original payload,
    ///   so the process observes it exactly as the target raised it;
    /// - an unchecked target failure is re-raised unchanged
    ///   ([`ReplError::Passthrough`]);
    /// - a checked target failure becomes [`ReplError::Faltering`], carrying
    ///   the cause. The called code failed for an application reason; the
    ///   dispatch mechanism did not.
    ///
    /// Synchronous, no side effects beyond the operation's own.
    pub fn invoke<T>(&self, op: impl FnOnce() -> Result<T, ReflectiveFailure>) -> ReplResult<T> {
        op().map_err(|failure| self.classify(failure))
    }

    fn classify(&self, failure: ReflectiveFailure) -> ReplError {
        match failure {
            ReflectiveFailure::Instantiation { type_name, source } => {
                ReplError::Misconfiguration {
                    kind: MisconfigurationKind::Instantiation,
                    message: format!("could not instantiate {type_name}"),
                    diagnostic: None,
                    source: Some(source),
                }
            }
            ReflectiveFailure::NoSuchMethod { signature, source } => ReplError::Misconfiguration {
                kind: MisconfigurationKind::NoSuchMethod,
                message: signature,
                diagnostic: None,
                source: Some(source),
            },
            ReflectiveFailure::NoSuchField { name, source } => ReplError::Misconfiguration {
                kind: MisconfigurationKind::NoSuchField,
                message: name,
                diagnostic: None,
                source: Some(source),
            },
            ReflectiveFailure::IllegalAccess { member, source } => ReplError::Misconfiguration {
                kind: MisconfigurationKind::IllegalAccess,
                message: member,
                diagnostic: None,
                source: Some(source),
            },
            ReflectiveFailure::ClassNotFound { type_name, source } => ReplError::Misconfiguration {
                kind: MisconfigurationKind::ClassNotFound,
                message: type_name,
                diagnostic: Some(search_path_diagnostic(&self.scopes)),
                source: Some(source),
            },
            ReflectiveFailure::Target(TargetFailure::Fatal(payload)) => {
                std::panic::resume_unwind(payload)
            }
            ReflectiveFailure::Target(TargetFailure::Unchecked(source)) => {
                ReplError::Passthrough(source)
            }
            ReflectiveFailure::Target(TargetFailure::Checked(source)) => {
                ReplError::Faltering { source }
            }
        }
    }
}
