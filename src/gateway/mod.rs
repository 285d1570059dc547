//! Remote Data Gateway: the seam to the hosted backend.
//!
//! The backend owns storage, row-level security, change-feed delivery and authentication.
//! This module only describes what the rest of the crate needs from it:
//!
//! - [`Gateway`] - table-scoped reads and writes plus named RPCs, all on JSON rows
//! - [`ChangeFeed`] - per-table insert/update/delete notifications
//! - [`AuthProvider`] - current session and auth-state transitions
//!
//! # Implementations
//!
//! - [`RestGateway`] speaks PostgREST-style HTTP (reads, writes, RPC).
//! - [`MemoryBackend`] keeps tables in process and implements all three traits; the demo
//!   binary and the integration tests run against it.
//! - [`mock::MockGateway`] answers from a queue of expectations for unit tests.

pub mod auth;
pub mod error;
pub mod feed;
pub mod memory;
pub mod mock;
pub mod query;
pub mod rest;

pub use auth::{AuthProvider, Session};
pub use error::GatewayError;
pub use feed::{ChangeFeed, ChangeKind, ChangeNotification, Subscription};
pub use memory::MemoryBackend;
pub use query::{Embed, Filter, OrderBy, Select, TextSearch};
pub use rest::RestGateway;

use async_trait::async_trait;
use serde_json::Value;

/// Table-scoped request/response access to the backend.
///
/// Rows travel as JSON objects; decoding into entity types happens in the caller, next to
/// the type that knows the row shape.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Read rows matching `query`.
    async fn select(&self, query: &Select) -> Result<Vec<Value>, GatewayError>;

    /// Insert one row and return it as stored, expanded with `embeds`.
    async fn insert(&self, table: &str, row: Value, embeds: &[Embed])
        -> Result<Value, GatewayError>;

    /// Apply `patch` to the row with `id` and return it as stored, expanded with `embeds`.
    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        embeds: &[Embed],
    ) -> Result<Value, GatewayError>;

    /// Delete every row matching all `filters`.
    async fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<(), GatewayError>;

    /// Invoke a named remote procedure.
    async fn rpc(&self, function: &str, args: Value) -> Result<Value, GatewayError>;

    /// Delete the row with `id`.
    async fn delete(&self, table: &str, id: &str) -> Result<(), GatewayError> {
        self.delete_where(table, &[Filter::eq("id", id)]).await
    }
}
