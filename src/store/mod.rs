//! Entity State Stores.
//!
//! Two snapshot types, each owned by its own [`StoreActor`](crate::framework::StoreActor):
//!
//! - [`ContentState`]: years, units, lecturers, notes, tags, search results, current user
//! - [`EditorialState`]: posts and categories
//!
//! [`StoreSlot`] maps an entity type to the collection that holds it and to the command that
//! carries its events, which is what lets the sync and command layers stay generic.

pub mod collection;
pub mod content;
pub mod editorial;

pub use collection::{Collection, CollectionEvent, CollectionStatus};
pub use content::{ContentCommand, ContentState};
pub use editorial::{EditorialCommand, EditorialState};

use crate::framework::StoreState;
use crate::model::Record;

/// A state holding a collection of `T`.
pub trait StoreSlot<T: Record>: StoreState {
    /// Wraps a collection event in this state's command type.
    fn command(event: CollectionEvent<T>) -> Self::Command;

    fn collection(&self) -> &Collection<T>;
}

macro_rules! store_slots {
    ($state:ty { $($entity:ty => $field:ident as $variant:path),* $(,)? }) => {$(
        impl $crate::store::StoreSlot<$entity> for $state {
            fn command(event: $crate::store::CollectionEvent<$entity>) -> Self::Command {
                $variant(event)
            }

            fn collection(&self) -> &$crate::store::Collection<$entity> {
                &self.$field
            }
        }
    )*};
}

pub(crate) use store_slots;

/// Records the message of a failed fetch as the state's latest error, and clears it again
/// once the collection that failed is replaced by a successful fetch.
pub(crate) fn track_failure<T: Record>(
    error: &mut Option<String>,
    source: &mut Option<&'static str>,
    event: &CollectionEvent<T>,
) {
    match event {
        CollectionEvent::Failed(message) => {
            *error = Some(message.clone());
            *source = Some(T::TABLE);
        }
        CollectionEvent::Replace(_) if *source == Some(T::TABLE) => {
            *error = None;
            *source = None;
        }
        _ => {}
    }
}
