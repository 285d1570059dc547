//! Notes, tags and their join and analytics rows.

use crate::gateway::{Embed, Select};
use crate::model::{
    is_blank, slugify, Draft, Lecturer, LecturerId, MissingFields, NoteId, Record, TagId, Unit,
    UnitId, Year, YearId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        }
    }
}

/// A label attached to notes. `parent_id` exists on the table but is never traversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent_id: Option<TagId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TagDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TagId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TagPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<TagId>>,
}

impl Draft for TagDraft {
    fn prepare(&mut self) -> Result<(), MissingFields> {
        MissingFields::check(&[("name", !is_blank(&self.name))])
    }
}

impl Record for Tag {
    type Id = TagId;
    type Draft = TagDraft;
    type Patch = TagPatch;
    const TABLE: &'static str = "tags";

    fn id(&self) -> &TagId {
        &self.id
    }

    fn listing() -> Select {
        Select::from(Self::TABLE).order_by("name", false)
    }
}

/// A study note.
///
/// Tags arrive as join rows (`note_tags: [{tag: {...}}]`) and are flattened into `tags`
/// while decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub unit_id: UnitId,
    pub year_id: YearId,
    #[serde(default)]
    pub lecturer_id: Option<LecturerId>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub difficulty_level: DifficultyLevel,
    #[serde(default)]
    pub estimated_read_time: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub download_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecturer: Option<Lecturer>,
    #[serde(
        default,
        rename(deserialize = "note_tags"),
        deserialize_with = "flatten_tags"
    )]
    pub tags: Vec<Tag>,
}

fn flatten_tags<'de, D>(deserializer: D) -> Result<Vec<Tag>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct JoinRow {
        tag: Option<Tag>,
    }

    let rows: Option<Vec<JoinRow>> = Option::deserialize(deserializer)?;
    Ok(rows
        .unwrap_or_default()
        .into_iter()
        .filter_map(|row| row.tag)
        .collect())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NoteDraft {
    pub title: String,
    /// Derived from the title when left empty.
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub unit_id: UnitId,
    pub year_id: YearId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<LecturerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub difficulty_level: DifficultyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_read_time: Option<i32>,
    pub is_published: bool,
    pub is_featured: bool,
}

/// `Some(None)` on a nullable column sends `null` and clears it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<UnitId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_id: Option<YearId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<Option<LecturerId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<DifficultyLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_read_time: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

impl Draft for NoteDraft {
    fn prepare(&mut self) -> Result<(), MissingFields> {
        if is_blank(&self.slug) {
            self.slug = slugify(&self.title);
        }
        MissingFields::check(&[
            ("title", !is_blank(&self.title)),
            ("slug", !is_blank(&self.slug)),
            ("content", !is_blank(&self.content)),
            ("excerpt", !is_blank(&self.excerpt)),
            ("unit_id", !is_blank(self.unit_id.as_str())),
            ("year_id", !is_blank(self.year_id.as_str())),
        ])
    }
}

impl Record for Note {
    type Id = NoteId;
    type Draft = NoteDraft;
    type Patch = NotePatch;
    const TABLE: &'static str = "notes";

    fn id(&self) -> &NoteId {
        &self.id
    }

    fn belongs(&self) -> bool {
        self.is_published
    }

    fn embeds() -> Vec<Embed> {
        vec![
            Embed::one("unit", "units", "unit_id"),
            Embed::one("year", "years", "year_id"),
            Embed::one("lecturer", "lecturers", "lecturer_id"),
            Embed::many(
                "note_tags",
                NoteTag::TABLE,
                "note_id",
                vec![Embed::one("tag", "tags", "tag_id")],
            ),
        ]
    }

    /// Published notes, newest first.
    fn listing() -> Select {
        Select::from(Self::TABLE)
            .embed_all(Self::embeds())
            .eq("is_published", true)
            .order_by("created_at", true)
    }
}

/// Join row linking a note to a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTag {
    pub note_id: NoteId,
    pub tag_id: TagId,
}

impl NoteTag {
    pub const TABLE: &'static str = "note_tags";
}

/// Append-only view event. Written, never read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    pub note_id: NoteId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl NoteView {
    pub const TABLE: &'static str = "note_views";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_rows_flatten_into_tags() {
        let note: Note = serde_json::from_value(json!({
            "id": "n1",
            "title": "Cardiac Cycle",
            "slug": "cardiac-cycle",
            "unit_id": "u1",
            "year_id": "y1",
            "note_tags": [
                {"note_id": "n1", "tag_id": "t1", "tag": {"id": "t1", "name": "Cardio"}},
                {"note_id": "n1", "tag_id": "t2", "tag": {"id": "t2", "name": "Physiology"}},
            ],
        }))
        .unwrap();

        let ids: Vec<&str> = note.tags.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(note.difficulty_level, DifficultyLevel::Beginner);
        assert_eq!(note.view_count, 0);
    }

    #[test]
    fn test_missing_or_null_join_rows_mean_no_tags() {
        let without: Note = serde_json::from_value(json!({
            "id": "n1", "title": "T", "slug": "t", "unit_id": "u1", "year_id": "y1",
        }))
        .unwrap();
        assert!(without.tags.is_empty());

        let null: Note = serde_json::from_value(json!({
            "id": "n1", "title": "T", "slug": "t", "unit_id": "u1", "year_id": "y1",
            "note_tags": null,
        }))
        .unwrap();
        assert!(null.tags.is_empty());
    }

    #[test]
    fn test_draft_derives_slug_and_checks_required_fields() {
        let mut draft = NoteDraft {
            title: "Cardiac Cycle".into(),
            content: "<p>Systole and diastole</p>".into(),
            excerpt: "Phases of the heartbeat".into(),
            unit_id: "u1".into(),
            year_id: "y1".into(),
            ..Default::default()
        };
        draft.prepare().unwrap();
        assert_eq!(draft.slug, "cardiac-cycle");

        let mut empty = NoteDraft::default();
        let missing = empty.prepare().unwrap_err();
        assert_eq!(
            missing.0,
            vec!["title", "slug", "content", "excerpt", "unit_id", "year_id"]
        );
    }

    #[test]
    fn test_note_listing_is_published_newest_first() {
        let listing = Note::listing();
        assert_eq!(listing.table, "notes");
        assert_eq!(listing.filters.len(), 1);
        assert_eq!(listing.order.map(|o| o.descending), Some(true));
        assert_eq!(listing.embeds.len(), 4);
    }
}
