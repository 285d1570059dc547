use crate::framework::FrameworkError;
use crate::gateway::GatewayError;
use crate::model::MissingFields;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Failure of a create, update or delete.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommandError {
    /// The draft lacks required fields; nothing was sent.
    #[error("invalid {table} draft: {source}")]
    Validation {
        table: &'static str,
        #[source]
        source: MissingFields,
    },

    /// The backend rejected the write.
    #[error("write to {table} rejected: {source}")]
    RemoteWrite {
        table: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("could not decode {table} row: {message}")]
    Decode {
        table: &'static str,
        message: String,
    },

    #[error("store unavailable: {0}")]
    Store(#[from] FrameworkError),
}

impl CommandError {
    /// Text suitable for a toast or form error.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Validation { source, .. } => {
                format!("Please fill in: {}", source.0.join(", "))
            }
            CommandError::RemoteWrite { source, .. } => source.message(),
            CommandError::Decode { .. } => "The server sent an unexpected response.".to_string(),
            CommandError::Store(_) => "The application is shutting down.".to_string(),
        }
    }
}

pub(crate) fn remote(table: &'static str) -> impl FnOnce(GatewayError) -> CommandError {
    move |source| CommandError::RemoteWrite { table, source }
}

pub(crate) fn decode_row<T: DeserializeOwned>(
    table: &'static str,
    row: Value,
) -> Result<T, CommandError> {
    serde_json::from_value(row).map_err(|e| CommandError::Decode {
        table,
        message: e.to_string(),
    })
}

pub(crate) fn encode<P: serde::Serialize>(
    table: &'static str,
    payload: &P,
) -> Result<Value, CommandError> {
    serde_json::to_value(payload).map_err(|e| CommandError::Decode {
        table,
        message: e.to_string(),
    })
}
