//! # Content Client
//!
//! Writes for years, units, lecturers, tags and notes, plus the note-specific operations:
//! tag linking, publishing and view tracking.

use crate::clients::error::{decode_row, encode, remote, CommandError};
use crate::clients::{typed_commands, CommandClient};
use crate::framework::StoreClient;
use crate::gateway::{Filter, Gateway, GatewayError, Select};
use crate::model::{
    Lecturer, Note, NoteDraft, NoteId, NotePatch, NoteTag, NoteView, Record, Tag, TagId, Unit,
    Year,
};
use crate::store::{CollectionEvent, ContentCommand, ContentState};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

const VIEW_COUNT_RPC: &str = "increment_note_view_count";

#[derive(Clone)]
pub struct ContentClient {
    gateway: Arc<dyn Gateway>,
    store: StoreClient<ContentState>,
}

impl CommandClient<ContentState> for ContentClient {
    fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    fn store(&self) -> &StoreClient<ContentState> {
        &self.store
    }
}

impl ContentClient {
    pub fn new(gateway: Arc<dyn Gateway>, store: StoreClient<ContentState>) -> Self {
        Self { gateway, store }
    }

    typed_commands!(
        year: Year,
        unit: Unit,
        lecturer: Lecturer,
        tag: Tag,
        note: Note,
    );

    /// Creates a note, links it to `tags`, then reloads it so the store holds the tag list
    /// as the backend sees it.
    #[instrument(skip(self, draft))]
    pub async fn create_note_with_tags(
        &self,
        draft: NoteDraft,
        tags: &[TagId],
    ) -> Result<Note, CommandError> {
        let note = self.create_note(draft).await?;
        if tags.is_empty() {
            return Ok(note);
        }
        self.link_tags(&note.id, tags).await?;
        self.reload_note(&note.id).await
    }

    /// Replaces the tag set of a note.
    #[instrument(skip(self))]
    pub async fn set_note_tags(
        &self,
        note_id: &NoteId,
        tags: &[TagId],
    ) -> Result<Note, CommandError> {
        self.gateway
            .delete_where(NoteTag::TABLE, &[Filter::eq("note_id", note_id.as_str())])
            .await
            .map_err(remote(NoteTag::TABLE))?;
        self.link_tags(note_id, tags).await?;
        self.reload_note(note_id).await
    }

    pub async fn set_note_published(
        &self,
        id: &NoteId,
        published: bool,
    ) -> Result<Note, CommandError> {
        let patch = NotePatch {
            is_published: Some(published),
            ..Default::default()
        };
        self.update_note(id, patch).await
    }

    pub async fn set_note_featured(
        &self,
        id: &NoteId,
        featured: bool,
    ) -> Result<Note, CommandError> {
        let patch = NotePatch {
            is_featured: Some(featured),
            ..Default::default()
        };
        self.update_note(id, patch).await
    }

    /// Records a view row, then bumps the note's counter in the background.
    ///
    /// The counter RPC is detached: its failure is logged and never reaches the caller. The
    /// handle is returned for callers that want to wait for it.
    #[instrument(skip(self, view), fields(note_id = %view.note_id))]
    pub async fn record_note_view(&self, view: NoteView) -> Result<JoinHandle<()>, CommandError> {
        let row = encode(NoteView::TABLE, &view)?;
        self.gateway
            .insert(NoteView::TABLE, row, &[])
            .await
            .map_err(remote(NoteView::TABLE))?;

        let gateway = self.gateway.clone();
        let note_id = view.note_id;
        Ok(tokio::spawn(async move {
            let args = json!({ "note_id": note_id.as_str() });
            match gateway.rpc(VIEW_COUNT_RPC, args).await {
                Ok(_) => debug!(note_id = %note_id, "View counted"),
                Err(error) => warn!(note_id = %note_id, error = %error, "View count failed"),
            }
        }))
    }

    async fn link_tags(&self, note_id: &NoteId, tags: &[TagId]) -> Result<(), CommandError> {
        for tag_id in tags {
            let link = NoteTag {
                note_id: note_id.clone(),
                tag_id: tag_id.clone(),
            };
            self.gateway
                .insert(NoteTag::TABLE, encode(NoteTag::TABLE, &link)?, &[])
                .await
                .map_err(remote(NoteTag::TABLE))?;
        }
        Ok(())
    }

    async fn reload_note(&self, id: &NoteId) -> Result<Note, CommandError> {
        let query = Select::from(Note::TABLE)
            .embed_all(Note::embeds())
            .eq("id", id.as_str());
        let row = self
            .gateway
            .select(&query)
            .await
            .map_err(remote(Note::TABLE))?
            .into_iter()
            .next()
            .ok_or_else(|| CommandError::RemoteWrite {
                table: Note::TABLE,
                source: GatewayError::NotFound {
                    table: Note::TABLE.to_string(),
                    id: id.to_string(),
                },
            })?;
        let note: Note = decode_row(Note::TABLE, row)?;
        self.store
            .dispatch(ContentCommand::Notes(CollectionEvent::Upsert(note.clone())))
            .await?;
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{apply_next, create_mock_store};
    use crate::framework::StoreState;
    use crate::gateway::memory::Operation;
    use crate::gateway::mock::MockGateway;
    use crate::model::{UnitId, YearDraft};
    use serde_json::Value;

    fn cardiac_draft() -> NoteDraft {
        NoteDraft {
            title: "Cardiac Cycle".into(),
            content: "<p>Systole and diastole</p>".into(),
            excerpt: "Phases of the heartbeat".into(),
            unit_id: "u1".into(),
            year_id: "y1".into(),
            is_published: true,
            ..Default::default()
        }
    }

    fn stored_note(id: &str) -> Value {
        json!({
            "id": id,
            "title": "Cardiac Cycle",
            "slug": "cardiac-cycle",
            "content": "<p>Systole and diastole</p>",
            "excerpt": "Phases of the heartbeat",
            "unit_id": "u1",
            "year_id": "y1",
            "is_published": true,
            "note_tags": [],
        })
    }

    #[tokio::test]
    async fn test_create_note_folds_the_server_row() {
        let gateway = Arc::new(MockGateway::new());
        gateway.expect_insert("notes").return_ok(stored_note("n1"));
        let (store, mut receiver) = create_mock_store::<ContentState>(8);
        let client = ContentClient::new(gateway.clone(), store);

        let task = tokio::spawn(async move { client.create_note(cardiac_draft()).await });
        let mut state = Arc::new(ContentState::default());
        assert_eq!(apply_next(&mut receiver, &mut state).await, Some("Notes"));

        let note = task.await.unwrap().unwrap();
        assert_eq!(note.id.as_str(), "n1");
        assert_eq!(state.notes.len(), 1);
        assert_eq!(state.notes.items()[0].slug, "cardiac-cycle");

        let received = gateway.received();
        assert_eq!(received[0].body["slug"], json!("cardiac-cycle"));
        assert_eq!(received[0].body["unit_id"], json!("u1"));
        gateway.verify();
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_the_backend() {
        let gateway = Arc::new(MockGateway::new());
        let (store, mut receiver) = create_mock_store::<ContentState>(8);
        let client = ContentClient::new(gateway.clone(), store);

        let result = client
            .create_year(YearDraft {
                name: " ".into(),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(CommandError::Validation { table: "years", .. })));
        assert!(gateway.received().is_empty());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_rejected_write_is_returned_and_not_folded() {
        let gateway = Arc::new(MockGateway::new());
        gateway
            .expect_update("units", "u1")
            .return_err(GatewayError::Status {
                status: 403,
                message: "new row violates row-level security policy".into(),
            });
        let (store, mut receiver) = create_mock_store::<ContentState>(8);
        let client = ContentClient::new(gateway.clone(), store);

        let result = client
            .update_unit(&UnitId::new("u1"), Default::default())
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.user_message(), "new row violates row-level security policy");
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_only_the_target() {
        let gateway = Arc::new(MockGateway::new());
        gateway.expect_delete("notes").return_ok(());
        let (store, mut receiver) = create_mock_store::<ContentState>(8);
        let client = ContentClient::new(gateway.clone(), store);

        let seeded = ContentState::default().reduce(ContentCommand::Notes(CollectionEvent::Replace(
            vec![
                serde_json::from_value(stored_note("n1")).unwrap(),
                serde_json::from_value(stored_note("n2")).unwrap(),
            ],
        )));
        let mut state = Arc::new(seeded);

        let task = tokio::spawn(async move { client.delete_note(&NoteId::new("n1")).await });
        apply_next(&mut receiver, &mut state).await;
        task.await.unwrap().unwrap();

        let ids: Vec<&str> = state.notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n2"]);
        assert_eq!(gateway.received()[0].filters, vec![Filter::eq("id", "n1")]);
    }

    #[tokio::test]
    async fn test_set_note_tags_rewrites_links_and_reloads() {
        let gateway = Arc::new(MockGateway::new());
        gateway.expect_delete("note_tags").return_ok(());
        gateway.expect_insert("note_tags").return_ok(json!({"note_id": "n1", "tag_id": "t1"}));
        let mut reloaded = stored_note("n1");
        reloaded["note_tags"] = json!([{"tag": {"id": "t1", "name": "Cardio"}}]);
        gateway.expect_select("notes").return_ok(vec![reloaded]);
        let (store, mut receiver) = create_mock_store::<ContentState>(8);
        let client = ContentClient::new(gateway.clone(), store);

        let task = tokio::spawn(async move {
            client
                .set_note_tags(&NoteId::new("n1"), &[TagId::new("t1")])
                .await
        });
        let mut state = Arc::new(ContentState::default());
        apply_next(&mut receiver, &mut state).await;

        let note = task.await.unwrap().unwrap();
        assert_eq!(note.tags.len(), 1);
        assert_eq!(state.notes.items()[0].tags[0].name, "Cardio");
        let received = gateway.received();
        assert_eq!(received[0].filters, vec![Filter::eq("note_id", "n1")]);
        assert_eq!(received[2].filters, vec![Filter::eq("id", "n1")]);
        gateway.verify();
    }

    #[tokio::test]
    async fn test_view_count_failure_is_detached() {
        let gateway = Arc::new(MockGateway::new());
        gateway.expect_insert("note_views").return_ok(json!({"id": "v1"}));
        gateway
            .expect_rpc(VIEW_COUNT_RPC)
            .return_err(GatewayError::Network("connection reset".into()));
        let (store, _receiver) = create_mock_store::<ContentState>(8);
        let client = ContentClient::new(gateway.clone(), store);

        let handle = client
            .record_note_view(NoteView {
                note_id: NoteId::new("n1"),
                user_id: None,
                user_agent: Some("test-agent".into()),
            })
            .await
            .unwrap();
        handle.await.unwrap();

        let received = gateway.received();
        assert_eq!(received[0].operation, Operation::Insert);
        assert_eq!(received[1].body, json!({"note_id": "n1"}));
        gateway.verify();
    }
}
