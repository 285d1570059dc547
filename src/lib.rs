//! # Medfly Sync
//!
//! > **The data layer of a medical-notes platform: entity stores kept in step with a hosted
//! > backend.**
//!
//! The backend (a PostgREST-style table API with a change feed and auth) owns storage and
//! access rules. This crate holds an in-memory, always-consistent picture of it for the
//! session: academic years, units, lecturers, notes and tags in one store, blog posts and
//! categories in another.
//!
//! ## Core Concepts
//!
//! ### Single-writer stores
//! Each store is a [`StoreActor`](framework::StoreActor) owning an immutable snapshot. All
//! writes are commands folded by a pure `reduce`, one at a time, and every new snapshot is
//! published on a `watch` channel. Readers clone an `Arc` and never see a half-applied update.
//!
//! ### Refetch, don't patch
//! A change notification on a table triggers a full refetch of that collection. The
//! [`SyncController`](sync::SyncController) performs exactly one refetch per notification
//! and never applies notification payloads directly.
//!
//! ### Commands reconcile with the server's answer
//! [`ContentClient`](clients::ContentClient) and [`EditorialClient`](clients::EditorialClient)
//! validate drafts, write through the [`Gateway`](gateway::Gateway), and fold the stored row
//! (server ids, defaults, timestamps, expanded joins) into the store.
//!
//! ## Module Tour
//!
//! - [`framework`]: `StoreState`, `StoreActor`, `StoreClient` and the mock store
//! - [`model`]: entity types with their draft/patch payloads and the
//!   [`Record`](model::Record) trait
//! - [`store`]: `ContentState` / `EditorialState` and their reducers
//! - [`gateway`]: backend seam (`Gateway`, `ChangeFeed`, `AuthProvider`) with REST, in-memory
//!   and mock implementations
//! - [`sync`]: bootstrap, change-feed refetch and auth mirroring
//! - [`clients`]: the command layer
//! - [`query`]: remote note search, slug lookups and client-side listing
//! - [`admin`]: the admin gate
//! - [`config`]: TOML plus environment configuration
//! - [`lifecycle`]: [`Platform`](lifecycle::Platform) startup/shutdown and tracing setup
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod admin;
pub mod clients;
pub mod config;
pub mod framework;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod query;
pub mod store;
pub mod sync;
