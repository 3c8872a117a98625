//! Feature identifiers and id generation.
//!
//! Ids are opaque strings. Fresh stroke ids come from an [`IdGenerator`]
//! injected at the brush boundary; tests swap in [`SequentialIdGenerator`]
//! to make ids predictable.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, unique identifier of a painted feature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    /// Creates an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `n`-th id derived from this one (`<id>/<n>`).
    ///
    /// Used for pieces minted while a brush is applied, so that replaying
    /// the same brush reproduces the same ids.
    pub fn derived(&self, n: usize) -> FeatureId {
        FeatureId(format!("{}/{}", self.0, n))
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for FeatureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh feature ids.
pub trait IdGenerator {
    /// Returns an id that has not been handed out before.
    fn next_id(&mut self) -> FeatureId;
}

/// Generates random UUID v4 ids. The default for interactive use.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> FeatureId {
        FeatureId(Uuid::new_v4().to_string())
    }
}

/// Generates `<prefix>-<n>` ids counting up from 1.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose first id is `<prefix>-1`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("feature")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> FeatureId {
        let id = FeatureId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
