//! Startup and shutdown of the whole data layer.

pub mod platform;
pub mod tracing;

pub use platform::{Backends, Platform};
pub use tracing::setup_tracing;
