//! Unrecoverable codec errors.
//!
//! Recoverable problems (a value too wide for its field, a negative number in an unsigned
//! field, ...) never show up here: they are recorded as [`Diagnostic`](crate::context::Diagnostic)s
//! in the [`ErrorContext`](crate::context::ErrorContext) and processing continues with a
//! substitute. A `CodecError` means the field was abandoned.

use crate::context::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Encoding an unbound value.
    #[error("{path}: unbound value: {message}")]
    Unbound { path: String, message: String },
    /// Recoverable error escalated to a failure (silent decoding).
    #[error("{path}: length error: {message}")]
    Length { path: String, message: String },
    /// Buffer exhausted before the field could be read.
    #[error("{path}: incomplete message: {message}")]
    Incomplete { path: String, message: String },
    #[error("{path}: sign error: {message}")]
    Sign { path: String, message: String },
    #[error("{path}: superfluous data: {message}")]
    Superfluous { path: String, message: String },
    #[error("buffer: {0}")]
    Buffer(#[from] BufferError),
}

impl CodecError {
    pub(crate) fn new(kind: ErrorKind, path: String, message: String) -> Self {
        match kind {
            ErrorKind::Unbound => CodecError::Unbound { path, message },
            ErrorKind::LengthError => CodecError::Length { path, message },
            ErrorKind::IncompleteMessage => CodecError::Incomplete { path, message },
            ErrorKind::SignError => CodecError::Sign { path, message },
            ErrorKind::Superfluous => CodecError::Superfluous { path, message },
        }
    }

    /// Error class, or `None` for low-level buffer misuse.
    pub fn kind(&self) -> Option<ErrorKind> {
        Some(match self {
            CodecError::Unbound { .. } => ErrorKind::Unbound,
            CodecError::Length { .. } => ErrorKind::LengthError,
            CodecError::Incomplete { .. } => ErrorKind::IncompleteMessage,
            CodecError::Sign { .. } => ErrorKind::SignError,
            CodecError::Superfluous { .. } => ErrorKind::Superfluous,
            CodecError::Buffer(_) => return None,
        })
    }

    /// Negative numeric code, as handed to composite decoders that only propagate a status.
    pub fn code(&self) -> i32 {
        match self.kind() {
            Some(kind) => -(kind as i32) - 1,
            None => -100,
        }
    }
}

/// Bit buffer misuse (reading past the end).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("insufficient bits: requested {requested}, available {available}")]
    InsufficientBits { requested: usize, available: usize },
    #[error("octet array too short: {octets} octets cannot hold {bits} bits")]
    ShortInput { octets: usize, bits: usize },
}
