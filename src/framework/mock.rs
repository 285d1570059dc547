//! # Mock Store
//!
//! Utilities for testing code that writes to a store without spawning a
//! [`StoreActor`](crate::framework::StoreActor).
//!
//! Use [`create_mock_store`] to get a client and the receiver its requests arrive on, then
//! [`expect_dispatch`] / [`expect_snapshot`] to assert on each request and answer it with a
//! snapshot (or an error) of your choosing.
//!
//! | Feature | Mock store | Real actor |
//! |---------|------------|------------|
//! | **Assertions** | Exact command inspection | Only resulting state |
//! | **Error Injection** | Easy (`respond_to.send(Err(..))`) | Requires dropping the actor |
//! | **Use Case** | Unit testing command and sync logic | Full system tests |

use crate::framework::{FrameworkError, Response, StoreClient, StoreRequest, StoreState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Creates a client wired to a receiver under test control.
///
/// The client's watch channel is fixed at `S::default()`; tests that need published
/// snapshots should use a real actor.
pub fn create_mock_store<S: StoreState>(
    buffer_size: usize,
) -> (StoreClient<S>, mpsc::Receiver<StoreRequest<S>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (_publisher, watcher) = watch::channel(Arc::new(S::default()));
    (StoreClient::new(sender, watcher), receiver)
}

/// Helper to verify that the next message is a Dispatch request.
pub async fn expect_dispatch<S: StoreState>(
    receiver: &mut mpsc::Receiver<StoreRequest<S>>,
) -> Option<(S::Command, Response<Arc<S>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Dispatch {
            command,
            respond_to,
        }) => Some((command, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Snapshot request.
pub async fn expect_snapshot<S: StoreState>(
    receiver: &mut mpsc::Receiver<StoreRequest<S>>,
) -> Option<Response<Arc<S>>> {
    match receiver.recv().await {
        Some(StoreRequest::Snapshot { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Answers the next Dispatch by actually reducing against `state`, returning the command.
///
/// Handy when the code under test inspects the snapshot it gets back.
pub async fn apply_next<S: StoreState>(
    receiver: &mut mpsc::Receiver<StoreRequest<S>>,
    state: &mut Arc<S>,
) -> Option<&'static str> {
    let (command, respond_to) = expect_dispatch(receiver).await?;
    let label = S::label(&command);
    *state = Arc::new(state.reduce(command));
    let _ = respond_to.send(Ok(state.clone()));
    Some(label)
}

/// Answers the next request of any kind with `error`.
pub async fn fail_next<S: StoreState>(
    receiver: &mut mpsc::Receiver<StoreRequest<S>>,
    error: FrameworkError,
) -> bool {
    match receiver.recv().await {
        Some(StoreRequest::Dispatch { respond_to, .. })
        | Some(StoreRequest::Snapshot { respond_to }) => respond_to.send(Err(error)).is_ok(),
        None => false,
    }
}
