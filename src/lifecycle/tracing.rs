//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `fmt` subscriber filtered by `RUST_LOG`.
//!
//! Every layer logs with structured fields rather than formatted strings, so a line can be
//! filtered on the collection or table it concerns:
//!
//! ```text
//! INFO Subscribed channel="notes-changes" table="notes"
//! DEBUG Fetched collection="notes" count=12
//! DEBUG Dispatch store_type="ContentState" command="Notes"
//! WARN Fetch failed collection="posts" error="backend returned 503: unavailable"
//! ```
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=medfly_sync::sync=debug cargo run
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Defaults to `info` when `RUST_LOG` is unset or invalid.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
