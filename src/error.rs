use crate::order::OrderError;

/// The main error type for the account core
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AccountError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the order error if this error came out of the order workflow.
    #[must_use]
    pub fn as_order_error(&self) -> Option<&OrderError> {
        match self {
            Self::Order(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the caller may sensibly retry the operation.
    ///
    /// Nothing is retried automatically; this only advises the UI layer.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ServiceUnavailable(_) => true,
            Self::Order(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Result type alias for account operations
pub type Result<T> = std::result::Result<T, AccountError>;
