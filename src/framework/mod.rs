//! Generic single-writer store framework.
//!
//! This module provides the building blocks the platform's state containers are made of:
//! an immutable snapshot type with a pure transition function, an actor task that owns the
//! current snapshot, and a cloneable client to talk to it.
//!
//! # Main Components
//!
//! - [`StoreState`] - Trait that snapshot types implement (`reduce(&self, command) -> Self`)
//! - [`StoreActor`] - Generic actor that owns a snapshot and applies commands sequentially
//! - [`StoreClient`] - Cloneable handle for dispatching commands and observing snapshots
//! - [`FrameworkError`] - Channel failures between client and actor
//!
//! # Testing
//!
//! See [`mock`] for utilities to test store writers without spawning an actor.

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod mock;
pub mod state;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use error::FrameworkError;
pub use message::{Response, StoreRequest};
pub use state::StoreState;
