//! Note search and single-row lookups.

use crate::framework::{FrameworkError, StoreClient};
use crate::gateway::{Gateway, GatewayError, Select};
use crate::model::{DifficultyLevel, LecturerId, Note, Post, Record, UnitId, YearId};
use crate::store::{ContentCommand, ContentState};
use crate::sync::fetch::decode_rows;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Columns matched by free-text search.
const TEXT_COLUMNS: [&str; 3] = ["title", "content", "excerpt"];

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    #[error("search failed: {0}")]
    Remote(#[from] GatewayError),

    #[error("could not decode search results: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Store(#[from] FrameworkError),
}

/// Free text plus structured filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteQuery {
    pub text: String,
    pub year: Option<YearId>,
    pub unit: Option<UnitId>,
    pub lecturer: Option<LecturerId>,
    pub difficulty: Option<DifficultyLevel>,
}

impl NoteQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// No text and no filter: the browse-all case.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.year.is_none()
            && self.unit.is_none()
            && self.lecturer.is_none()
            && self.difficulty.is_none()
    }

    /// The remote read for this query: published notes only, newest first, at most `limit`.
    pub fn to_select(&self, limit: usize) -> Select {
        let mut select = Select::from(Note::TABLE).embed_all(Note::embeds());
        let text = self.text.trim();
        if !text.is_empty() {
            select = select.search(TEXT_COLUMNS.to_vec(), text);
        }
        if let Some(year) = &self.year {
            select = select.eq("year_id", year.as_str());
        }
        if let Some(unit) = &self.unit {
            select = select.eq("unit_id", unit.as_str());
        }
        if let Some(lecturer) = &self.lecturer {
            select = select.eq("lecturer_id", lecturer.as_str());
        }
        if let Some(difficulty) = self.difficulty {
            select = select.eq("difficulty_level", difficulty.as_str());
        }
        select
            .eq("is_published", true)
            .order_by("created_at", true)
            .limit(limit)
    }
}

/// Resolves note listings, remotely or from the store.
#[derive(Clone)]
pub struct NoteSearch {
    gateway: Arc<dyn Gateway>,
    store: StoreClient<ContentState>,
    limit: usize,
}

impl NoteSearch {
    pub fn new(gateway: Arc<dyn Gateway>, store: StoreClient<ContentState>, limit: usize) -> Self {
        Self {
            gateway,
            store,
            limit,
        }
    }

    /// Runs `query` and stores the results as the current search results.
    ///
    /// An empty query answers with the held published-notes collection itself, without a
    /// network round trip. Anything else goes to the backend, bracketed by the searching flag.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &NoteQuery) -> Result<Arc<Vec<Note>>, SearchError> {
        if query.is_empty() {
            let snapshot = self.store.snapshot().await?;
            let notes = snapshot.notes.shared();
            debug!(count = notes.len(), "Browsing held notes");
            self.store
                .dispatch(ContentCommand::SetSearchResults(notes.clone()))
                .await?;
            return Ok(notes);
        }

        self.store.dispatch(ContentCommand::SetSearching(true)).await?;
        let outcome = self.remote(query).await;
        self.store
            .dispatch(ContentCommand::SetSearching(false))
            .await?;

        let notes = match outcome {
            Ok(notes) => Arc::new(notes),
            Err(error) => {
                warn!(error = %error, "Search failed");
                return Err(error);
            }
        };
        debug!(count = notes.len(), "Search complete");
        self.store
            .dispatch(ContentCommand::SetSearchResults(notes.clone()))
            .await?;
        Ok(notes)
    }

    async fn remote(&self, query: &NoteQuery) -> Result<Vec<Note>, SearchError> {
        let rows = self.gateway.select(&query.to_select(self.limit)).await?;
        decode_rows(rows).map_err(|e| SearchError::Decode(e.to_string()))
    }

    pub async fn note_by_slug(&self, slug: &str) -> Result<Option<Note>, SearchError> {
        note_by_slug(self.gateway.as_ref(), slug).await
    }
}

async fn first_by_slug<T: Record>(
    gateway: &dyn Gateway,
    select: Select,
) -> Result<Option<T>, SearchError> {
    let rows = gateway.select(&select.limit(1)).await?;
    let mut found: Vec<T> = decode_rows(rows).map_err(|e| SearchError::Decode(e.to_string()))?;
    Ok(found.pop())
}

/// The published note with `slug`, embeds included.
pub async fn note_by_slug(gateway: &dyn Gateway, slug: &str) -> Result<Option<Note>, SearchError> {
    let select = Select::from(Note::TABLE)
        .embed_all(Note::embeds())
        .eq("slug", slug)
        .eq("is_published", true);
    first_by_slug(gateway, select).await
}

/// The published post with `slug`, category included.
pub async fn post_by_slug(gateway: &dyn Gateway, slug: &str) -> Result<Option<Post>, SearchError> {
    let select = Select::from(Post::TABLE)
        .embed_all(Post::embeds())
        .eq("slug", slug)
        .eq("published", true);
    first_by_slug(gateway, select).await
}
