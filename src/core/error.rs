//! Gatekeeper error types

use thiserror::Error;

use crate::store::CollectionError;

/// Errors that can occur while classifying, submitting or resolving commands
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// The intent does not carry enough parameters for the mapped mutation
    #[error("Malformed intent: {0}")]
    MalformedIntent(String),

    /// Unknown or already-resolved approval id
    #[error("Approval request not found: {0}")]
    ApprovalNotFound(String),

    /// The collection call failed after the approval was consumed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A classifier pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl GatekeeperError {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        GatekeeperError::Other(msg.into())
    }

    /// Create a malformed intent error
    pub fn malformed(msg: impl Into<String>) -> Self {
        GatekeeperError::MalformedIntent(msg.into())
    }

    /// Create an execution failure
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        GatekeeperError::ExecutionFailed(msg.into())
    }

    /// Stable machine-readable code, used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            GatekeeperError::MalformedIntent(_) => "malformed_intent",
            GatekeeperError::ApprovalNotFound(_) => "not_found",
            GatekeeperError::ExecutionFailed(_) => "execution_failed",
            GatekeeperError::InvalidConfig(_) => "invalid_config",
            GatekeeperError::InvalidPattern(_) => "invalid_pattern",
            GatekeeperError::Io(_) => "io",
            GatekeeperError::Serialization(_) => "serialization",
            GatekeeperError::Other(_) => "internal",
        }
    }
}

impl From<CollectionError> for GatekeeperError {
    fn from(err: CollectionError) -> Self {
        GatekeeperError::ExecutionFailed(err.to_string())
    }
}

/// Result type alias for gatekeeper operations
pub type GatekeeperResult<T> = Result<T, GatekeeperError>;
