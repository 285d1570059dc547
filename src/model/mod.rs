//! Entity types as they arrive from the backend, plus their create (draft) and update (patch)
//! payloads.
//!
//! Every entity implements [`Record`], which ties it to its table, its join-expansion and its
//! payload types so the store, sync and command layers can stay generic.

pub mod academic;
pub mod editorial;
pub mod note;
pub mod record;
pub mod slug;

pub use academic::*;
pub use editorial::*;
pub use note::*;
pub use record::{Draft, MissingFields, Record};
pub use slug::slugify;

/// Declares string-backed id newtypes for server-assigned ids.
macro_rules! record_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {$(
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    )*};
}

record_id!(
    YearId,
    UnitId,
    LecturerId,
    TagId,
    NoteId,
    CategoryId,
    PostId,
);

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
