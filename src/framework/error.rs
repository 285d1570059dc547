//! # Framework Errors
//!
//! Errors raised by the store plumbing itself (channels between a
//! [`StoreClient`](crate::framework::StoreClient) and its actor). Domain failures live in the
//! error types of the layers that own them.

/// Errors that can occur within the store framework itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Store actor closed")]
    ActorClosed,
    #[error("Store actor dropped response channel")]
    ActorDropped,
}
