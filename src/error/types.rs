//! Error types for the REPL transport core.

use thiserror::Error;

/// Boxed cause preserved inside normalized errors.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum ReplError {
    /// A reflective lookup failed in a way the operator must fix:
    /// missing type, missing member, access denial, or a constructor
    /// that could not produce an instance.
    #[error("Misconfiguration [{}]: {message}", kind.code())]
    Misconfiguration {
        kind: MisconfigurationKind,
        message: String,
        /// Search-path dump; populated only for `ClassNotFound`.
        diagnostic: Option<String>,
        #[source]
        source: Option<Cause>,
    },

    /// The environment faltered: invoked target code failed for an
    /// application reason, or transport I/O broke mid-session.
    #[error("Environment faltered")]
    Faltering {
        #[source]
        source: Cause,
    },

    /// Ordinary unchecked failure from invoked target code, re-raised
    /// unchanged. Display and source delegate to the inner error.
    #[error(transparent)]
    Passthrough(Cause),

    /// Session-fatal wire conditions.
    #[error("Transport error: {kind}")]
    Transport { kind: TransportErrorKind },

    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire codec errors.
    #[error("Codec error: {0}")]
    Codec(#[from] postcard::Error),
}

/// Closed set of reflective-failure kinds. New members may be added in a
/// release; existing codes never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MisconfigurationKind {
    /// Reflective construction could not produce an instance.
    Instantiation,
    /// Requested method or constructor signature not found.
    NoSuchMethod,
    /// Requested field not found.
    NoSuchField,
    /// Caller lacks rights to access the member.
    IllegalAccess,
    /// Requested type could not be resolved.
    ClassNotFound,
}

impl MisconfigurationKind {
    /// Stable machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Instantiation => "INSTANTIATION",
            Self::NoSuchMethod => "NO_SUCH_METHOD",
            Self::NoSuchField => "NO_SUCH_FIELD",
            Self::IllegalAccess => "ILLEGAL_ACCESS",
            Self::ClassNotFound => "CLASS_NOT_FOUND",
        }
    }
}

impl std::fmt::Display for MisconfigurationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Transport error kinds. Every one of these is fatal to the session.
#[derive(Error, Debug)]
pub enum TransportErrorKind {
    #[error("Frame too large: {size} bytes exceeds maximum of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Invalid frame: {message}")]
    InvalidFrame { message: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timed out")]
    ConnectionTimeout,

    #[error("Session already closed")]
    SessionClosed,
}

impl ReplError {
    /// Shorthand for a transport-level error.
    pub fn transport(kind: TransportErrorKind) -> Self {
        ReplError::Transport { kind }
    }

    /// Wrap a cause as an environment-faltered error.
    pub fn faltering(source: impl Into<Cause>) -> Self {
        ReplError::Faltering {
            source: source.into(),
        }
    }

    /// The stable misconfiguration code, if this error carries one.
    pub fn misconfiguration_kind(&self) -> Option<MisconfigurationKind> {
        match self {
            ReplError::Misconfiguration { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type alias for transport and invoker operations.
pub type ReplResult<T> = Result<T, ReplError>;
