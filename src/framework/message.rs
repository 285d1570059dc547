//! # Store Messages
//!
//! This module defines the message types exchanged between a
//! [`StoreClient`](crate::framework::StoreClient) and its
//! [`StoreActor`](crate::framework::StoreActor).

use crate::framework::error::FrameworkError;
use crate::framework::state::StoreState;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the store actor.
///
/// There are only two operations on a store:
///
/// - **Dispatch**: apply a command through [`StoreState::reduce`] and answer with the new
///   snapshot.
/// - **Snapshot**: answer with the current snapshot without changing it.
///
/// Reads that do not need to be ordered after a write can use
/// [`StoreClient::latest`](crate::framework::StoreClient::latest) instead, which reads the
/// watch channel without a round trip.
#[derive(Debug)]
pub enum StoreRequest<S: StoreState> {
    Dispatch {
        command: S::Command,
        respond_to: Response<Arc<S>>,
    },
    Snapshot {
        respond_to: Response<Arc<S>>,
    },
}
