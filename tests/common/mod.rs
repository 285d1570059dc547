#![allow(dead_code)]

use medfly_sync::config::AppConfig;
use medfly_sync::framework::{StoreClient, StoreState};
use medfly_sync::gateway::MemoryBackend;
use medfly_sync::lifecycle::{Backends, Platform};
use medfly_sync::model::{NoteDraft, UnitId, YearId};
use medfly_sync::sync::{BootstrapReport, CollectionKind, Refetched};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(2);

/// A backend holding one year and one unit of that year.
pub fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .seed(
            "years",
            [json!({ "id": "year-1", "year_number": 1, "name": "First Year" })],
        )
        .unwrap();
    backend
        .seed(
            "units",
            [json!({
                "id": "unit-phys",
                "name": "Physiology",
                "code": "PHY101",
                "year_id": "year-1"
            })],
        )
        .unwrap();
    backend
}

pub async fn start(backend: &Arc<MemoryBackend>) -> (Platform, BootstrapReport) {
    Platform::start(&AppConfig::default(), Backends::memory(backend.clone())).await
}

/// Reads and writes only: nothing refetches after a write.
pub async fn start_without_feed(backend: &Arc<MemoryBackend>) -> (Platform, BootstrapReport) {
    let backends = Backends {
        gateway: backend.clone(),
        feed: None,
        auth: None,
    };
    Platform::start(&AppConfig::default(), backends).await
}

pub fn note_draft(title: &str) -> NoteDraft {
    NoteDraft {
        title: title.to_string(),
        content: format!("<p>{title} in detail.</p>"),
        excerpt: format!("{title} summary"),
        unit_id: UnitId::new("unit-phys"),
        year_id: YearId::new("year-1"),
        is_published: true,
        ..Default::default()
    }
}

/// Waits until the published snapshot satisfies `predicate`.
pub async fn wait_until<S, F>(store: &StoreClient<S>, predicate: F) -> Arc<S>
where
    S: StoreState,
    F: Fn(&S) -> bool,
{
    let mut watcher = store.subscribe();
    timeout(WAIT, async {
        loop {
            let current = watcher.borrow_and_update().clone();
            if predicate(&current) {
                return current;
            }
            watcher.changed().await.expect("store closed");
        }
    })
    .await
    .expect("store never reached the expected state")
}

/// Next refetch of `kind`, skipping refetches of other collections.
pub async fn next_refetch(
    events: &mut broadcast::Receiver<Refetched>,
    kind: CollectionKind,
) -> Refetched {
    timeout(WAIT, async {
        loop {
            let event = events.recv().await.expect("refetch channel closed");
            if event.kind == kind {
                return event;
            }
        }
    })
    .await
    .expect("no refetch arrived")
}
