//! Query/Search Layer.
//!
//! - [`NoteSearch`]: remote filtered search, or the held collection for the browse-all case
//! - [`note_by_slug`] / [`post_by_slug`]: single published rows
//! - [`ListingFilter`]: client-side filter and sort over held notes or posts

pub mod listing;
pub mod search;

pub use listing::{compare_titles, Listable, ListingFilter, ParseSortOrderError, SortOrder};
pub use search::{note_by_slug, post_by_slug, NoteQuery, NoteSearch, SearchError};
