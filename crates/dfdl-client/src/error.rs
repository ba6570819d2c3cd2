//! Error types for the client library.

use std::fmt;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The table, row or column family does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The table already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The caller lacks permission for the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Credentials are missing or were rejected.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The request was rejected as malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The service could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Channel setup failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A `ReadRows` response violated the chunking rules.
    #[error("invalid chunk in read stream: {0}")]
    InvalidChunk(String),

    /// The handle was already closed.
    #[error("handle closed")]
    Closed,

    /// Writing program output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other status returned by the service.
    #[error("server error ({code:?}): {message}")]
    Status {
        /// The gRPC status code.
        code: tonic::Code,
        /// The message attached to the status.
        message: String,
    },
}

impl ClientError {
    /// Returns true for the one failure kind the session recovers from.
    ///
    /// A missing table and a missing column family both surface as not
    /// found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Returns the message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            ClientError::NotFound(msg)
            | ClientError::AlreadyExists(msg)
            | ClientError::PermissionDenied(msg)
            | ClientError::Unauthenticated(msg)
            | ClientError::InvalidArgument(msg)
            | ClientError::Unavailable(msg)
            | ClientError::InvalidConfig(msg)
            | ClientError::Transport(msg)
            | ClientError::InvalidChunk(msg) => msg.clone(),
            ClientError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<tonic::Status> for ClientError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            tonic::Code::NotFound => ClientError::NotFound(message),
            tonic::Code::AlreadyExists => ClientError::AlreadyExists(message),
            tonic::Code::PermissionDenied => ClientError::PermissionDenied(message),
            tonic::Code::Unauthenticated => ClientError::Unauthenticated(message),
            tonic::Code::InvalidArgument => ClientError::InvalidArgument(message),
            tonic::Code::Unavailable => ClientError::Unavailable(message),
            code => ClientError::Status { code, message },
        }
    }
}

impl From<tonic::transport::Error> for ClientError {
    fn from(err: tonic::transport::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Lifecycle of a store handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Ready for calls.
    Open,
    /// Released; every call fails with [`ClientError::Closed`].
    Closed,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleState::Open => write!(f, "open"),
            HandleState::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ClientError = tonic::Status::not_found("table t not found").into();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "table t not found");

        let err: ClientError = tonic::Status::permission_denied("nope").into();
        assert!(matches!(err, ClientError::PermissionDenied(_)));
        assert!(!err.is_not_found());

        let err: ClientError = tonic::Status::deadline_exceeded("slow").into();
        match err {
            ClientError::Status { code, message } => {
                assert_eq!(code, tonic::Code::DeadlineExceeded);
                assert_eq!(message, "slow");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let err = ClientError::NotFound("table dfdl-schemas".to_string());
        assert_eq!(err.to_string(), "not found: table dfdl-schemas");
        assert_eq!(ClientError::Closed.message(), "handle closed");
        assert_eq!(HandleState::Closed.to_string(), "closed");
    }
}
