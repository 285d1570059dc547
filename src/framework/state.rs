//! # StoreState Trait
//!
//! The `StoreState` trait defines the contract every snapshot type (content, editorial, ...)
//! must satisfy to be owned by the generic [`StoreActor`](crate::framework::StoreActor).
//! A state is an immutable value; the only way to move forward is the pure transition
//! [`StoreState::reduce`], which takes the current snapshot and one command and returns the
//! next snapshot.
//!
//! Keeping `reduce` free of I/O means every property of a store can be checked with plain
//! `#[test]` functions, without spawning the actor at all.

use std::fmt::Debug;

/// A snapshot type managed by a [`StoreActor`](crate::framework::StoreActor).
///
/// # Associated Types
/// - `Command`: the tagged union of discrete update events this state accepts.
///
/// # Contract
/// `reduce` must not mutate `self`. Collections that a command does not touch should be
/// shared with the previous snapshot (they are `Arc`-backed), so observers can detect changes
/// cheaply with pointer comparisons.
pub trait StoreState: Clone + Default + Debug + Send + Sync + 'static {
    /// The event type consumed by [`StoreState::reduce`].
    type Command: Send + Debug;

    /// Apply one command and return the next snapshot.
    fn reduce(&self, command: Self::Command) -> Self;

    /// Short, payload-free name of a command, used for logging.
    fn label(command: &Self::Command) -> &'static str;
}
