//! # Sync Controller
//!
//! Keeps both stores in step with the backend for the length of a session:
//!
//! 1. opens one change-feed subscription per watched table (channel `"{table}-changes"`),
//! 2. fetches every collection once, concurrently,
//! 3. refetches a whole collection for each notification on its table,
//! 4. mirrors the backend session into `ContentState::current_user`.
//!
//! Subscriptions are opened before the first fetch so a change landing mid-bootstrap still
//! triggers a refetch. A subscription that fails to open is reported and skipped; a feed
//! that closes is not reopened.

use crate::framework::StoreClient;
use crate::gateway::{AuthProvider, ChangeFeed, Gateway, GatewayError, Subscription};
use crate::model::{Category, Lecturer, Note, Post, Record, Tag, Unit, Year};
use crate::store::{ContentCommand, ContentState, EditorialState};
use crate::sync::fetch::{fetch_collection, FetchError};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A synced collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Years,
    Units,
    Lecturers,
    Notes,
    Tags,
    Posts,
    Categories,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 7] = [
        CollectionKind::Years,
        CollectionKind::Units,
        CollectionKind::Lecturers,
        CollectionKind::Notes,
        CollectionKind::Tags,
        CollectionKind::Posts,
        CollectionKind::Categories,
    ];

    pub fn table(self) -> &'static str {
        match self {
            CollectionKind::Years => Year::TABLE,
            CollectionKind::Units => Unit::TABLE,
            CollectionKind::Lecturers => Lecturer::TABLE,
            CollectionKind::Notes => Note::TABLE,
            CollectionKind::Tags => Tag::TABLE,
            CollectionKind::Posts => Post::TABLE,
            CollectionKind::Categories => Category::TABLE,
        }
    }

    pub fn channel(self) -> String {
        format!("{}-changes", self.table())
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Emitted after each notification-driven refetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Refetched {
    pub kind: CollectionKind,
    /// Rows loaded, or `None` when the refetch failed.
    pub rows: Option<usize>,
}

/// Outcome of the initial fetches and subscriptions.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub loaded: Vec<(CollectionKind, usize)>,
    pub failed: Vec<(CollectionKind, FetchError)>,
    pub unwatched: Vec<(CollectionKind, GatewayError)>,
}

impl BootstrapReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.unwatched.is_empty()
    }

    pub fn rows(&self, kind: CollectionKind) -> Option<usize> {
        self.loaded
            .iter()
            .find(|(loaded, _)| *loaded == kind)
            .map(|(_, rows)| *rows)
    }
}

#[derive(Clone)]
struct Targets {
    gateway: Arc<dyn Gateway>,
    content: StoreClient<ContentState>,
    editorial: StoreClient<EditorialState>,
}

impl Targets {
    async fn fetch(&self, kind: CollectionKind) -> Result<usize, FetchError> {
        let gateway = self.gateway.as_ref();
        match kind {
            CollectionKind::Years => fetch_collection::<Year, _>(gateway, &self.content).await,
            CollectionKind::Units => fetch_collection::<Unit, _>(gateway, &self.content).await,
            CollectionKind::Lecturers => {
                fetch_collection::<Lecturer, _>(gateway, &self.content).await
            }
            CollectionKind::Notes => fetch_collection::<Note, _>(gateway, &self.content).await,
            CollectionKind::Tags => fetch_collection::<Tag, _>(gateway, &self.content).await,
            CollectionKind::Posts => fetch_collection::<Post, _>(gateway, &self.editorial).await,
            CollectionKind::Categories => {
                fetch_collection::<Category, _>(gateway, &self.editorial).await
            }
        }
    }
}

pub struct SyncController {
    targets: Targets,
    events: broadcast::Sender<Refetched>,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncController {
    /// Subscribes, bootstraps every collection and starts following auth state.
    ///
    /// `feed` and `auth` are optional: without a feed collections are only loaded once (and
    /// on [`refresh`](Self::refresh)); without auth `current_user` stays empty.
    pub async fn start(
        gateway: Arc<dyn Gateway>,
        feed: Option<Arc<dyn ChangeFeed>>,
        auth: Option<Arc<dyn AuthProvider>>,
        content: StoreClient<ContentState>,
        editorial: StoreClient<EditorialState>,
    ) -> (Self, BootstrapReport) {
        let (events, _) = broadcast::channel(64);
        let mut controller = Self {
            targets: Targets {
                gateway,
                content,
                editorial,
            },
            events,
            tasks: Vec::new(),
        };
        let mut report = BootstrapReport::default();

        if let Some(feed) = feed {
            for kind in CollectionKind::ALL {
                let channel = kind.channel();
                match feed.subscribe(&channel, kind.table()).await {
                    Ok(subscription) => {
                        info!(channel = %channel, table = kind.table(), "Subscribed");
                        controller.watch_table(kind, subscription);
                    }
                    Err(error) => {
                        warn!(channel = %channel, error = %error, "Subscription failed");
                        report.unwatched.push((kind, error));
                    }
                }
            }
        }

        if let Some(auth) = auth {
            controller.follow_auth(auth).await;
        }

        let targets = &controller.targets;
        let results = tokio::join!(
            targets.fetch(CollectionKind::Years),
            targets.fetch(CollectionKind::Units),
            targets.fetch(CollectionKind::Lecturers),
            targets.fetch(CollectionKind::Notes),
            targets.fetch(CollectionKind::Tags),
            targets.fetch(CollectionKind::Posts),
            targets.fetch(CollectionKind::Categories),
        );
        let results = [
            results.0, results.1, results.2, results.3, results.4, results.5, results.6,
        ];
        for (kind, result) in CollectionKind::ALL.into_iter().zip(results) {
            match result {
                Ok(rows) => report.loaded.push((kind, rows)),
                Err(error) => report.failed.push((kind, error)),
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            unwatched = report.unwatched.len(),
            "Bootstrap complete"
        );
        (controller, report)
    }

    fn watch_table(&mut self, kind: CollectionKind, mut subscription: Subscription) {
        let targets = self.targets.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            while let Some(notification) = subscription.next().await {
                debug!(
                    collection = kind.table(),
                    change = ?notification.kind,
                    "Change notification"
                );
                let rows = match targets.fetch(kind).await {
                    Ok(rows) => Some(rows),
                    Err(FetchError::Store(_)) => break,
                    Err(_) => None,
                };
                let _ = events.send(Refetched { kind, rows });
            }
            info!(channel = subscription.channel(), "Change feed closed");
        });
        self.tasks.push(handle);
    }

    async fn follow_auth(&mut self, auth: Arc<dyn AuthProvider>) {
        let mut watcher = auth.watch_auth();
        let session = match auth.current_session().await {
            Ok(session) => session,
            Err(error) => {
                warn!(error = %error, "Could not read session");
                None
            }
        };
        let content = self.targets.content.clone();
        if let Err(error) = content.dispatch(ContentCommand::SetCurrentUser(session)).await {
            warn!(error = %error, "Could not record session");
            return;
        }

        let handle = tokio::spawn(async move {
            while watcher.changed().await.is_ok() {
                let session = watcher.borrow_and_update().clone();
                debug!(signed_in = session.is_some(), "Auth state changed");
                if content
                    .dispatch(ContentCommand::SetCurrentUser(session))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });
        self.tasks.push(handle);
    }

    /// Refetches one collection now. The manual retry path after a failed fetch.
    pub async fn refresh(&self, kind: CollectionKind) -> Result<usize, FetchError> {
        self.targets.fetch(kind).await
    }

    /// Refetch notifications, one per processed change notification.
    pub fn refetches(&self) -> broadcast::Receiver<Refetched> {
        self.events.subscribe()
    }

    /// Stops following the backend. Dropping the tasks releases their subscriptions.
    pub async fn shutdown(mut self) {
        let tasks = std::mem::take(&mut self.tasks);
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            let _ = task.await;
        }
        info!("Sync stopped");
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
