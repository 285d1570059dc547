//! Client-side filter and sort for browse views.

use crate::model::{Note, Post};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    /// Case-folded title, raw title as tiebreak.
    Alphabetical,
    /// Most viewed first; newest first among equals and for items without a view count.
    Popular,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order: {0}")]
pub struct ParseSortOrderError(String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "alphabetical" => Ok(SortOrder::Alphabetical),
            "popular" => Ok(SortOrder::Popular),
            _ => Err(ParseSortOrderError(s.to_string())),
        }
    }
}

/// The fields a browse view filters and sorts on.
pub trait Listable {
    fn title(&self) -> &str;
    fn excerpt(&self) -> &str;
    fn content(&self) -> &str;
    fn category_name(&self) -> Option<&str>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn popularity(&self) -> Option<i64>;
}

impl Listable for Note {
    fn title(&self) -> &str {
        &self.title
    }

    fn excerpt(&self) -> &str {
        &self.excerpt
    }

    fn content(&self) -> &str {
        &self.content
    }

    // Notes are grouped by unit.
    fn category_name(&self) -> Option<&str> {
        self.unit.as_ref().map(|unit| unit.name.as_str())
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn popularity(&self) -> Option<i64> {
        Some(self.view_count)
    }
}

impl Listable for Post {
    fn title(&self) -> &str {
        &self.title
    }

    fn excerpt(&self) -> &str {
        &self.excerpt
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|category| category.name.as_str())
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn popularity(&self) -> Option<i64> {
        None
    }
}

/// Total order on titles: case-folded first, then the raw text.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub query: String,
    pub sort: SortOrder,
}

impl ListingFilter {
    pub fn new(query: impl Into<String>, sort: SortOrder) -> Self {
        Self {
            query: query.into(),
            sort,
        }
    }

    /// Case-insensitive substring match over title, excerpt, content and category name.
    pub fn matches<T: Listable>(&self, item: &T) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        contains(item.title())
            || contains(item.excerpt())
            || contains(item.content())
            || item.category_name().is_some_and(contains)
    }

    pub fn compare<T: Listable>(&self, a: &T, b: &T) -> Ordering {
        let newest = || b.created_at().cmp(&a.created_at());
        match self.sort {
            SortOrder::Newest => newest(),
            SortOrder::Oldest => a.created_at().cmp(&b.created_at()),
            SortOrder::Alphabetical => compare_titles(a.title(), b.title()),
            SortOrder::Popular => match (a.popularity(), b.popularity()) {
                (Some(x), Some(y)) => y.cmp(&x).then_with(newest),
                _ => newest(),
            },
        }
    }

    /// Matching items in display order.
    pub fn apply<'a, T: Listable>(&self, items: &'a [T]) -> Vec<&'a T> {
        let mut listed: Vec<&T> = items.iter().filter(|item| self.matches(*item)).collect();
        listed.sort_by(|a, b| self.compare(*a, *b));
        listed
    }
}
