//! Bootstrap and change-feed driven refetching of every collection.

pub mod controller;
pub mod fetch;

pub use controller::{BootstrapReport, CollectionKind, Refetched, SyncController};
pub use fetch::{fetch_collection, load, FetchError};
