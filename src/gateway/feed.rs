//! Change-feed subscriptions.

use crate::gateway::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Kind of row change carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One change-feed event for a watched table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    pub table: String,
    /// The new row (null for deletes).
    pub record: Value,
    /// The previous row when the backend provides it (null otherwise).
    pub old_record: Value,
}

/// A live subscription to one channel. Dropping it unsubscribes.
pub struct Subscription {
    channel: String,
    receiver: mpsc::UnboundedReceiver<ChangeNotification>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        channel: impl Into<String>,
        receiver: mpsc::UnboundedReceiver<ChangeNotification>,
    ) -> Self {
        Self {
            channel: channel.into(),
            receiver,
            teardown: None,
        }
    }

    /// Registers the action that releases the subscription on the backend side.
    pub fn on_teardown(mut self, teardown: impl FnOnce() + Send + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next notification, or `None` once the backend closes the channel.
    pub async fn next(&mut self) -> Option<ChangeNotification> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Push channel of row changes.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to insert/update/delete notifications for `table` on channel `channel`.
    async fn subscribe(&self, channel: &str, table: &str) -> Result<Subscription, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_notification_kind_uses_uppercase_wire_names() {
        let raw = serde_json::json!({
            "kind": "UPDATE",
            "table": "notes",
            "record": {"id": "n1"},
            "old_record": null,
        });
        let notification: ChangeNotification = serde_json::from_value(raw).unwrap();
        assert_eq!(notification.kind, ChangeKind::Update);
        assert_eq!(notification.table, "notes");
    }

    #[tokio::test]
    async fn test_drop_runs_teardown_once() {
        let released = Arc::new(AtomicBool::new(false));
        let flag = released.clone();
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut subscription = Subscription::new("notes-changes", receiver)
            .on_teardown(move || flag.store(true, Ordering::SeqCst));

        sender
            .send(ChangeNotification {
                kind: ChangeKind::Insert,
                table: "notes".into(),
                record: serde_json::json!({"id": "n1"}),
                old_record: Value::Null,
            })
            .unwrap();
        assert_eq!(subscription.next().await.unwrap().kind, ChangeKind::Insert);
        assert!(!released.load(Ordering::SeqCst));

        drop(subscription);
        assert!(released.load(Ordering::SeqCst));
    }
}
