use miette::Diagnostic;
use thiserror::Error;

/// Result type for midend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or transforming a program
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum Error {
    #[error("I/O error: {0}")]
    #[diagnostic(code(p4_midend::io_error))]
    Io(String),

    #[error("Malformed IR: {message}")]
    #[diagnostic(code(p4_midend::malformed_ir))]
    MalformedIr { message: String },

    #[error("Invalid midend options: {message}")]
    #[diagnostic(code(p4_midend::invalid_options))]
    InvalidOptions { message: String },

    #[error("Internal compiler error: {message}")]
    #[diagnostic(
        code(p4_midend::internal_error),
        help("the input violated an invariant of the midend; this is a compiler bug, not a user error")
    )]
    Internal { message: String },
}

impl Error {
    /// Create an internal error (a violated invariant of a pass)
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Create a malformed-IR error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedIr {
            message: message.into(),
        }
    }

    /// Whether this error reports a violated internal invariant
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedIr {
            message: err.to_string(),
        }
    }
}
