//! # Generic Store Client
//!
//! This module defines the cloneable handle used to talk to a
//! [`StoreActor`](crate::framework::StoreActor).

use crate::framework::error::FrameworkError;
use crate::framework::message::StoreRequest;
use crate::framework::state::StoreState;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// A type-safe handle for interacting with a `StoreActor`.
///
/// * **Cloneable** – holds only a sender and a watch receiver, so cloning is inexpensive.
/// * **Ordered writes** – [`dispatch`](Self::dispatch) resolves once the command has been
///   applied and returns the resulting snapshot.
/// * **Cheap reads** – [`latest`](Self::latest) borrows the most recently published snapshot
///   without a round trip through the actor.
pub struct StoreClient<S: StoreState> {
    sender: mpsc::Sender<StoreRequest<S>>,
    watcher: watch::Receiver<Arc<S>>,
}

impl<S: StoreState> Clone for StoreClient<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            watcher: self.watcher.clone(),
        }
    }
}

impl<S: StoreState> StoreClient<S> {
    pub fn new(sender: mpsc::Sender<StoreRequest<S>>, watcher: watch::Receiver<Arc<S>>) -> Self {
        Self { sender, watcher }
    }

    /// Apply `command` and return the snapshot it produced.
    pub async fn dispatch(&self, command: S::Command) -> Result<Arc<S>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Dispatch {
                command,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Current snapshot, ordered after every dispatch already sent by this task.
    pub async fn snapshot(&self) -> Result<Arc<S>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Snapshot { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Most recently published snapshot.
    pub fn latest(&self) -> Arc<S> {
        self.watcher.borrow().clone()
    }

    /// A receiver notified on every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<S>> {
        self.watcher.clone()
    }
}
