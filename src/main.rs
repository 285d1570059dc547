//! Demo: runs the data layer against the in-process backend.
//!
//! Seeds a year and a unit, starts the platform, writes a note and searches for it.

use medfly_sync::config;
use medfly_sync::gateway::MemoryBackend;
use medfly_sync::lifecycle::{setup_tracing, Backends, Platform};
use medfly_sync::model::{NoteDraft, UnitId, YearId};
use medfly_sync::query::NoteQuery;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = config::load(Path::new("medfly.toml")).map_err(|e| e.to_string())?;

    let backend = Arc::new(MemoryBackend::new());
    backend
        .seed(
            "years",
            [json!({ "id": "year-1", "year_number": 1, "name": "First Year" })],
        )
        .map_err(|e| e.to_string())?;
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
        .map_err(|e| e.to_string())?;
    backend.sign_in("student-1", Some("student@medfly.example".to_string()));

    let (platform, report) = Platform::start(&config, Backends::memory(backend.clone())).await;
    if !report.is_complete() {
        warn!(
            failed = report.failed.len(),
            unwatched = report.unwatched.len(),
            "Partial bootstrap"
        );
    }

    let draft = NoteDraft {
        title: "Cardiac Cycle".to_string(),
        content: "<p>Systole and diastole.</p>".to_string(),
        excerpt: "Phases of the heartbeat".to_string(),
        unit_id: UnitId::new("unit-phys"),
        year_id: YearId::new("year-1"),
        is_published: true,
        ..Default::default()
    };

    let span = tracing::info_span!("note_creation");
    let created = async {
        info!("Creating note");
        platform.content.create_note(draft).await
    }
    .instrument(span)
    .await;

    match created {
        Ok(note) => info!(note_id = %note.id, slug = %note.slug, "Note created"),
        Err(e) => error!(error = %e, "Note creation failed"),
    }

    match platform.search.search(&NoteQuery::text("cardiac")).await {
        Ok(hits) => info!(hits = hits.len(), "Search finished"),
        Err(e) => error!(error = %e, "Search failed"),
    }

    let state = platform.content_store.latest();
    info!(
        notes = state.notes.len(),
        units = state.units.len(),
        signed_in = state.current_user.is_some(),
        "Final content state"
    );

    platform.shutdown().await?;
    info!("Demo completed");
    Ok(())
}
