//! # Record Trait
//!
//! The contract every backend entity implements so the generic layers can handle it: which
//! table it lives in, how its id is read, which related rows are embedded when it is read
//! back, and which payload types create and update it.

use crate::gateway::{Embed, Select};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;

pub trait Record: Clone + Debug + DeserializeOwned + Send + Sync + 'static {
    /// Server-assigned identifier.
    type Id: Clone + Eq + Hash + Display + Debug + AsRef<str> + Send + Sync + 'static;

    /// Create payload.
    type Draft: Draft;

    /// Update payload; only set fields are serialized.
    type Patch: Serialize + Debug + Send + Sync;

    /// Backend table name.
    const TABLE: &'static str;

    fn id(&self) -> &Self::Id;

    /// Whether this row passes the filter of [`listing`](Record::listing). A row that does
    /// not is dropped from the held collection instead of being upserted.
    fn belongs(&self) -> bool {
        true
    }

    /// Join-expansion applied to every read and write of this entity.
    fn embeds() -> Vec<Embed> {
        Vec::new()
    }

    /// The read that (re)loads the whole collection.
    fn listing() -> Select {
        Select::from(Self::TABLE).embed_all(Self::embeds())
    }
}

/// A create payload.
pub trait Draft: Serialize + Debug + Send + Sync {
    /// Checks the required field set and fills derived fields (such as a slug from the title).
    fn prepare(&mut self) -> Result<(), MissingFields>;
}

/// Required fields absent from a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl MissingFields {
    /// Fails with every field whose `present` flag is false.
    pub fn check(fields: &[(&'static str, bool)]) -> Result<(), Self> {
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Self(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_lists_every_missing_field() {
        let result =
            MissingFields::check(&[("title", false), ("content", true), ("excerpt", false)]);
        let missing = result.unwrap_err();
        assert_eq!(missing.0, vec!["title", "excerpt"]);
        assert_eq!(missing.to_string(), "missing required fields: title, excerpt");

        assert!(MissingFields::check(&[("name", true)]).is_ok());
    }
}
