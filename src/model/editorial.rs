//! Blog-style editorial content: categories and posts.

use crate::gateway::{Embed, Select};
use crate::model::{is_blank, slugify, CategoryId, Draft, MissingFields, PostId, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryDraft {
    pub name: String,
    /// Derived from the name when left empty.
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl Draft for CategoryDraft {
    fn prepare(&mut self) -> Result<(), MissingFields> {
        if is_blank(&self.slug) {
            self.slug = slugify(&self.name);
        }
        MissingFields::check(&[
            ("name", !is_blank(&self.name)),
            ("slug", !is_blank(&self.slug)),
        ])
    }
}

impl Record for Category {
    type Id = CategoryId;
    type Draft = CategoryDraft;
    type Patch = CategoryPatch;
    const TABLE: &'static str = "categories";

    fn id(&self) -> &CategoryId {
        &self.id
    }

    fn listing() -> Select {
        Select::from(Self::TABLE).order_by("name", false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostDraft {
    pub title: String,
    /// Derived from the title when left empty.
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl Draft for PostDraft {
    fn prepare(&mut self) -> Result<(), MissingFields> {
        if is_blank(&self.slug) {
            self.slug = slugify(&self.title);
        }
        MissingFields::check(&[
            ("title", !is_blank(&self.title)),
            ("slug", !is_blank(&self.slug)),
            ("content", !is_blank(&self.content)),
            ("excerpt", !is_blank(&self.excerpt)),
        ])
    }
}

impl Record for Post {
    type Id = PostId;
    type Draft = PostDraft;
    type Patch = PostPatch;
    const TABLE: &'static str = "posts";

    fn id(&self) -> &PostId {
        &self.id
    }

    fn embeds() -> Vec<Embed> {
        vec![Embed::one("category", "categories", "category_id")]
    }

    /// Every post, drafts included, newest first.
    fn listing() -> Select {
        Select::from(Self::TABLE)
            .embed_all(Self::embeds())
            .order_by("created_at", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_decodes_with_category() {
        let post: Post = serde_json::from_value(json!({
            "id": "p1",
            "title": "Exam tips",
            "slug": "exam-tips",
            "content": "<p>Sleep</p>",
            "excerpt": "Sleep",
            "category_id": "c1",
            "published": true,
            "created_at": "2024-03-01T09:30:00.000000Z",
            "category": {"id": "c1", "name": "Study", "slug": "study"},
        }))
        .unwrap();

        assert_eq!(post.category.map(|c| c.name), Some("Study".to_string()));
        assert!(post.created_at.is_some());
    }

    #[test]
    fn test_category_draft_derives_slug_from_name() {
        let mut draft = CategoryDraft {
            name: "Study Skills".into(),
            ..Default::default()
        };
        draft.prepare().unwrap();
        assert_eq!(draft.slug, "study-skills");
    }
}
