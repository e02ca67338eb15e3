use thiserror::Error;

/// Errors returned by adapter, factory and stream operations.
///
/// Every variant carries a short context message; callers branch on the
/// variant, the message is for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PassthroughError {
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("busy: {0}")]
    Busy(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Failure reported by a driver transport for a bind, unbind or dispatch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("driver rejected command with code {code}")]
    Rejected { code: i32 },

    #[error("driver unavailable: {0}")]
    Unavailable(String),

    #[error("unknown driver handle {0}")]
    UnknownHandle(u64),
}

impl TransportError {
    /// Numeric code recorded in the diagnostics ring for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::Rejected { code } => *code,
            Self::Unavailable(_) => -1,
            Self::UnknownHandle(_) => -2,
        }
    }
}

/// Failure reported by a path selector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("scene not supported")]
    NotSupported,

    #[error("path selection failed: {0}")]
    Failed(String),
}

impl From<PathError> for PassthroughError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::NotSupported => PassthroughError::NotSupported("scene".into()),
            PathError::Failed(msg) => PassthroughError::Internal(msg),
        }
    }
}
