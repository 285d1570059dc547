mod common;

use common::{note_draft, seeded_backend, start, start_without_feed, wait_until};
use medfly_sync::clients::CommandError;
use medfly_sync::gateway::memory::Operation;
use medfly_sync::gateway::GatewayError;
use medfly_sync::model::{
    CategoryDraft, LecturerDraft, NoteDraft, NotePatch, NoteView, PostDraft, TagDraft, UnitDraft,
    UnitPatch, YearId,
};
use medfly_sync::query::{post_by_slug, NoteQuery};

#[tokio::test]
async fn test_invalid_draft_never_reaches_backend() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;

    let draft = NoteDraft {
        title: "Untitled".to_string(),
        ..Default::default()
    };
    let err = platform.content.create_note(draft).await.unwrap_err();

    match &err {
        CommandError::Validation { table, source } => {
            assert_eq!(*table, "notes");
            assert!(source.0.contains(&"content"));
            assert!(source.0.contains(&"unit_id"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(err.user_message().starts_with("Please fill in:"));
    assert_eq!(backend.count(Operation::Insert, "notes"), 0);

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_slug_is_rejected_by_backend() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;

    platform
        .content
        .create_note(note_draft("Cardiac Cycle"))
        .await
        .expect("First note should be created");
    let err = platform
        .content
        .create_note(note_draft("Cardiac Cycle"))
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        CommandError::RemoteWrite {
            table: "notes",
            source: GatewayError::Constraint(_)
        }
    ));
    assert!(err.user_message().contains("notes_slug_key"));
    assert_eq!(backend.rows("notes").len(), 1);

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_note_with_tags_comes_back_with_flat_tag_list() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;

    let cardiology = platform
        .content
        .create_tag(TagDraft {
            name: "Cardiology".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let exams = platform
        .content
        .create_tag(TagDraft {
            name: "Exams".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let note = platform
        .content
        .create_note_with_tags(
            note_draft("Heart Sounds"),
            &[cardiology.id.clone(), exams.id.clone()],
        )
        .await
        .expect("Failed to create tagged note");

    let mut names: Vec<&str> = note.tags.iter().map(|t| t.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Cardiology", "Exams"]);
    assert_eq!(backend.rows("note_tags").len(), 2);

    // Replacing the links drops the old ones.
    let retagged = platform
        .content
        .set_note_tags(&note.id, &[exams.id.clone()])
        .await
        .unwrap();
    assert_eq!(retagged.tags.len(), 1);
    assert_eq!(retagged.tags[0].id, exams.id);
    assert_eq!(backend.rows("note_tags").len(), 1);

    // Refetches triggered by earlier writes may land after the reload.
    wait_until(&platform.content_store, |s| {
        s.notes.get(&note.id).is_some_and(|n| n.tags.len() == 1)
    })
    .await;

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unit_lifecycle() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;

    let unit = platform
        .content
        .create_unit(UnitDraft {
            name: "Anatomy".to_string(),
            code: "ANA101".to_string(),
            year_id: YearId::new("year-1"),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(unit.is_active);
    assert_eq!(unit.year.as_ref().map(|y| y.name.as_str()), Some("First Year"));

    let renamed = platform
        .content
        .update_unit(
            &unit.id,
            UnitPatch {
                name: Some("Gross Anatomy".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Gross Anatomy");
    assert_eq!(renamed.code, "ANA101");

    // No notes reference the unit, so it goes without any cleanup.
    platform.content.delete_unit(&unit.id).await.unwrap();
    let state = wait_until(&platform.content_store, |s| s.unit(&unit.id).is_none()).await;
    assert!(state.notes_for_unit(&unit.id).is_empty());
    assert_eq!(backend.rows("units").len(), 1);

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_patch_can_clear_a_nullable_column() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;

    let lecturer = platform
        .content
        .create_lecturer(LecturerDraft {
            name: "Dr. Wanjiru".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let note = platform
        .content
        .create_note(NoteDraft {
            lecturer_id: Some(lecturer.id.clone()),
            estimated_read_time: Some(12),
            ..note_draft("Heart Failure")
        })
        .await
        .unwrap();
    assert_eq!(note.lecturer.as_ref().map(|l| &l.id), Some(&lecturer.id));

    let cleared = platform
        .content
        .update_note(
            &note.id,
            NotePatch {
                lecturer_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.lecturer_id.is_none());
    assert!(cleared.lecturer.is_none());
    // Columns the patch leaves unset keep their value.
    assert_eq!(cleared.estimated_read_time, Some(12));
    assert!(backend.rows("notes")[0]["lecturer_id"].is_null());

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unpublished_note_leaves_the_store() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;

    let note = platform
        .content
        .create_note(note_draft("Action Potentials"))
        .await
        .unwrap();
    wait_until(&platform.content_store, |s| s.notes.get(&note.id).is_some()).await;

    let hidden = platform
        .content
        .set_note_published(&note.id, false)
        .await
        .unwrap();
    assert!(!hidden.is_published);

    wait_until(&platform.content_store, |s| s.notes.get(&note.id).is_none()).await;

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_drafts_stay_out_of_held_notes_without_a_feed() {
    let backend = seeded_backend();
    let (platform, _) = start_without_feed(&backend).await;

    let draft = platform
        .content
        .create_note(NoteDraft {
            is_published: false,
            ..note_draft("Renal Clearance")
        })
        .await
        .unwrap();
    assert!(!draft.is_published);
    assert!(platform.content_store.latest().notes.get(&draft.id).is_none());
    let held = platform.search.search(&NoteQuery::default()).await.unwrap();
    assert!(held.is_empty());

    let note = platform
        .content
        .create_note(note_draft("Action Potentials"))
        .await
        .unwrap();
    assert!(platform.content_store.latest().notes.get(&note.id).is_some());

    // Unpublishing takes effect on the write itself.
    platform
        .content
        .set_note_published(&note.id, false)
        .await
        .unwrap();
    let state = platform.content_store.latest();
    assert!(state.notes.is_empty());
    assert_eq!(backend.rows("notes").len(), 2);

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_view_counter_failure_does_not_fail_the_view() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;
    let note = platform
        .content
        .create_note(note_draft("Cardiac Output"))
        .await
        .unwrap();

    backend.fail("increment_note_view_count", "function timed out");
    let handle = platform
        .content
        .record_note_view(NoteView {
            note_id: note.id.clone(),
            user_id: Some("student-1".to_string()),
            user_agent: None,
        })
        .await
        .expect("View insert should succeed");
    handle.await.unwrap();

    assert_eq!(backend.rows("note_views").len(), 1);
    assert_eq!(backend.count(Operation::Rpc, "increment_note_view_count"), 1);
    assert_eq!(backend.rows("notes")[0]["view_count"], 0);

    platform.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_post_publishing_flow() {
    let backend = seeded_backend();
    let (platform, _) = start(&backend).await;

    let category = platform
        .editorial
        .create_category(CategoryDraft {
            name: "Study Skills".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(category.slug, "study-skills");

    let post = platform
        .editorial
        .create_post(PostDraft {
            title: "Spaced Repetition".to_string(),
            content: "<p>Review often.</p>".to_string(),
            excerpt: "Remember more".to_string(),
            category_id: Some(category.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!post.published);
    assert_eq!(post.category.as_ref().map(|c| c.name.as_str()), Some("Study Skills"));

    // Drafts are held but not publicly reachable.
    wait_until(&platform.editorial_store, |s| s.posts.get(&post.id).is_some()).await;
    assert!(post_by_slug(backend.as_ref(), "spaced-repetition")
        .await
        .unwrap()
        .is_none());

    let live = platform.editorial.publish_post(&post.id, true).await.unwrap();
    assert!(live.published);
    let found = post_by_slug(backend.as_ref(), "spaced-repetition")
        .await
        .unwrap()
        .expect("published post not found");
    assert_eq!(found.id, post.id);

    platform.editorial.delete_post(&post.id).await.unwrap();
    wait_until(&platform.editorial_store, |s| s.posts.is_empty()).await;

    platform.shutdown().await.unwrap();
}
