//! Error types for object streams.
//!
//! Three layers:
//! - [`StreamError`]: local, synchronous rejection of a stream operation
//! - [`Status`]: application error carried through a stream as a terminal message
//! - [`TransferError`]: what callers above the stream see for a whole transfer

use std::fmt;
use thiserror::Error;

/// Local failure of a stream operation.
///
/// Returned immediately to the caller; nothing is sent to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A required payload was absent (an empty message).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The half this operation targets is already terminal.
    #[error("stream is closed")]
    AlreadyClosed,
}

/// Status codes for carried errors (gRPC-aligned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Unknown,
    Cancelled,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    FailedPrecondition,
    Aborted,
    Internal,
    Unavailable,
    DataLoss,
}

impl Code {
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Unknown => "unknown",
            Code::Cancelled => "cancelled",
            Code::InvalidArgument => "invalid argument",
            Code::NotFound => "not found",
            Code::AlreadyExists => "already exists",
            Code::PermissionDenied => "permission denied",
            Code::FailedPrecondition => "failed precondition",
            Code::Aborted => "aborted",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data loss",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An application error delivered through a stream as its terminal message.
///
/// This is how a storage backend reports failure (missing object, rejected
/// upload) without tearing down the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct Status {
    code: Code,
    message: String,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(Code::FailedPrecondition, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Code::Internal, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(Code::Unavailable, message)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StreamError> for Status {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::InvalidArgument(_) => Status::invalid_argument(err.to_string()),
            StreamError::AlreadyClosed => Status::failed_precondition(err.to_string()),
        }
    }
}

/// Failure of a complete upload or download, as seen above the stream.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("plugin returned error: {0}")]
    Plugin(#[from] Status),

    /// The response half closed without a terminal message.
    #[error("stream ended before the plugin sent a result")]
    UnexpectedEof,
}
