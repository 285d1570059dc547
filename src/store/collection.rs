//! One entity collection and the events that move it forward.

use crate::model::Record;
use std::sync::Arc;

/// Load state of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CollectionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Discrete update event for one collection.
#[derive(Debug, Clone)]
pub enum CollectionEvent<T: Record> {
    /// A fetch started; items are kept.
    Loading,
    /// Swap the whole collection.
    Replace(Vec<T>),
    /// Replace the entity with the same id in place, or append it. An entity outside the
    /// listing filter is removed instead.
    Upsert(T),
    /// Drop the entity with this id.
    Remove(T::Id),
    /// A fetch failed; items are kept.
    Failed(String),
}

impl<T: Record> CollectionEvent<T> {
    pub fn label(&self) -> &'static str {
        match self {
            CollectionEvent::Loading => "loading",
            CollectionEvent::Replace(_) => "replace",
            CollectionEvent::Upsert(_) => "upsert",
            CollectionEvent::Remove(_) => "remove",
            CollectionEvent::Failed(_) => "failed",
        }
    }
}

/// An immutable collection snapshot. Items are shared between snapshots until an event
/// touches them.
#[derive(Debug)]
pub struct Collection<T> {
    items: Arc<Vec<T>>,
    status: CollectionStatus,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            status: self.status.clone(),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            status: CollectionStatus::Idle,
        }
    }
}

impl<T: Record> Collection<T> {
    /// A loaded collection holding `items`.
    pub fn ready(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
            status: CollectionStatus::Ready,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The shared item list itself; pointer-equal across snapshots that did not touch it.
    pub fn shared(&self) -> Arc<Vec<T>> {
        self.items.clone()
    }

    pub fn status(&self) -> &CollectionStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == CollectionStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            CollectionStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Returns the collection after `event`. `self` is left untouched.
    pub fn apply(&self, event: CollectionEvent<T>) -> Self {
        match event {
            CollectionEvent::Loading => Self {
                items: self.items.clone(),
                status: CollectionStatus::Loading,
            },
            CollectionEvent::Replace(items) => Self::ready(items),
            CollectionEvent::Upsert(entity) if !entity.belongs() => {
                self.apply(CollectionEvent::Remove(entity.id().clone()))
            }
            CollectionEvent::Upsert(entity) => {
                let mut items = Vec::with_capacity(self.items.len() + 1);
                let mut replaced = false;
                for item in self.items.iter() {
                    if item.id() == entity.id() {
                        items.push(entity.clone());
                        replaced = true;
                    } else {
                        items.push(item.clone());
                    }
                }
                if !replaced {
                    items.push(entity);
                }
                Self {
                    items: Arc::new(items),
                    status: self.status.clone(),
                }
            }
            CollectionEvent::Remove(id) => Self {
                items: Arc::new(
                    self.items
                        .iter()
                        .filter(|item| item.id() != &id)
                        .cloned()
                        .collect(),
                ),
                status: self.status.clone(),
            },
            CollectionEvent::Failed(message) => Self {
                items: self.items.clone(),
                status: CollectionStatus::Failed(message),
            },
        }
    }
}
