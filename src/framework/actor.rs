//! # Generic Store Actor
//!
//! This module defines the `StoreActor`, the single writer of a store. It implements the
//! "Server" side of the Actor Model: commands are processed sequentially, so the snapshot it
//! owns never needs a lock even on a multi-threaded runtime.

use crate::framework::client::StoreClient;
use crate::framework::message::StoreRequest;
use crate::framework::state::StoreState;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// The generic actor that owns one store snapshot.
///
/// # Architecture Note
/// This struct is the "Server" half of the store. It owns the current `Arc<S>` and the
/// receiver end of the request channel.
///
/// **Concurrency Model**:
/// Fetch tasks, change-feed tasks and command callers all hold cloned
/// [`StoreClient`]s and may dispatch at the same time. The actor applies their commands one
/// at a time in arrival order, so every update is atomic from the caller's point of view and
/// the last collection-replace for a collection wins.
///
/// # Publishing
/// After each dispatch the new snapshot is published on a `watch` channel. Observers
/// ([`StoreClient::subscribe`]) always see a complete snapshot, never a partially applied one.
///
/// # Usage Pattern
///
/// ```rust,ignore
/// let (actor, client) = StoreActor::<ContentState>::new(32);
/// let handle = tokio::spawn(actor.run());
///
/// client.dispatch(ContentCommand::SetSearching(true)).await?;
/// assert!(client.latest().is_searching);
/// ```
pub struct StoreActor<S: StoreState> {
    receiver: mpsc::Receiver<StoreRequest<S>>,
    state: Arc<S>,
    publisher: watch::Sender<Arc<S>>,
}

impl<S: StoreState> StoreActor<S> {
    /// Creates a new `StoreActor` starting from `S::default()` and its associated client.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<S>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let state = Arc::new(S::default());
        let (publisher, watcher) = watch::channel(state.clone());
        let actor = Self {
            receiver,
            state,
            publisher,
        };
        let client = StoreClient::new(sender, watcher);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self) {
        // "ContentState" instead of "medfly_sync::store::content::ContentState"
        let store_type = std::any::type_name::<S>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(store_type, "Store started");

        let mut applied: u64 = 0;
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Dispatch {
                    command,
                    respond_to,
                } => {
                    debug!(store_type, command = S::label(&command), "Dispatch");
                    let next = Arc::new(self.state.reduce(command));
                    self.state = next.clone();
                    self.publisher.send_replace(next.clone());
                    applied += 1;
                    let _ = respond_to.send(Ok(next));
                }
                StoreRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.state.clone()));
                }
            }
        }

        info!(store_type, applied, "Shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        value: i64,
        history: Arc<Vec<i64>>,
    }

    #[derive(Debug)]
    enum CounterCommand {
        Add(i64),
        Reset,
    }

    impl StoreState for Counter {
        type Command = CounterCommand;

        fn reduce(&self, command: CounterCommand) -> Self {
            let mut next = self.clone();
            match command {
                CounterCommand::Add(n) => next.value += n,
                CounterCommand::Reset => next.value = 0,
            }
            let mut history = (*self.history).clone();
            history.push(next.value);
            next.history = Arc::new(history);
            next
        }

        fn label(command: &CounterCommand) -> &'static str {
            match command {
                CounterCommand::Add(_) => "add",
                CounterCommand::Reset => "reset",
            }
        }
    }

    #[tokio::test]
    async fn test_store_actor_applies_commands_in_order() {
        let (actor, client) = StoreActor::<Counter>::new(8);
        let handle = tokio::spawn(actor.run());

        client.dispatch(CounterCommand::Add(2)).await.unwrap();
        client.dispatch(CounterCommand::Add(3)).await.unwrap();
        let after_reset = client.dispatch(CounterCommand::Reset).await.unwrap();

        assert_eq!(after_reset.value, 0);
        assert_eq!(*after_reset.history, vec![2, 5, 0]);

        let snapshot = client.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&snapshot, &after_reset));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_previous_snapshots_are_never_mutated() {
        let (actor, client) = StoreActor::<Counter>::new(8);
        tokio::spawn(actor.run());

        let first = client.dispatch(CounterCommand::Add(1)).await.unwrap();
        let second = client.dispatch(CounterCommand::Add(1)).await.unwrap();

        assert_eq!(first.value, 1);
        assert_eq!(*first.history, vec![1]);
        assert_eq!(second.value, 2);
    }

    #[tokio::test]
    async fn test_watchers_see_published_snapshot() {
        let (actor, client) = StoreActor::<Counter>::new(8);
        tokio::spawn(actor.run());
        let mut watcher = client.subscribe();

        client.dispatch(CounterCommand::Add(7)).await.unwrap();

        watcher.changed().await.unwrap();
        assert_eq!(watcher.borrow().value, 7);
        assert_eq!(client.latest().value, 7);
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_reports_closed() {
        let (actor, client) = StoreActor::<Counter>::new(8);
        drop(actor);

        let result = client.dispatch(CounterCommand::Add(1)).await;
        assert_eq!(result, Err(crate::framework::FrameworkError::ActorClosed));
    }
}
