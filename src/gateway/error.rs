//! Error types for the remote data gateway.

use thiserror::Error;

/// Errors returned by a [`Gateway`](crate::gateway::Gateway),
/// [`ChangeFeed`](crate::gateway::ChangeFeed) or [`AuthProvider`](crate::gateway::AuthProvider).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A uniqueness or reference constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The targeted row does not exist.
    #[error("row {id} not found in {table}")]
    NotFound { table: String, id: String },

    /// The response body could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// The backend does not offer this capability.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Failure injected by a test backend.
    #[error("{0}")]
    Injected(String),
}

impl GatewayError {
    /// The message the backend attached to the failure, without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Network(msg)
            | Self::Constraint(msg)
            | Self::Decode(msg)
            | Self::UnknownTable(msg)
            | Self::UnknownFunction(msg)
            | Self::Unsupported(msg)
            | Self::Injected(msg) => msg.clone(),
            Self::NotFound { .. } => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}
