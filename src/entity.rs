//! Lifecycle and versioning shared by calendars and events

use serde::{Deserialize, Serialize};

/// Where an entity stands relative to the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    /// Built locally and never created on the server. It has no identifier and no edit locator
    New,
    /// Loaded from (or created on) the server
    Persisted,
    /// Removed from the server. This is terminal: its attributes have been cleared and it cannot be saved again
    Deleted,
}

impl Default for EntityState {
    fn default() -> Self {
        EntityState::New
    }
}

impl EntityState {
    pub fn exists(&self) -> bool {
        *self == EntityState::Persisted
    }
}


/// A VersionTag is an HTTP entity tag (`etag`). Whenever it changes, this means the data has changed on the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTag {
    tag: String
}

impl From<String> for VersionTag {
    fn from(tag: String) -> VersionTag {
        Self { tag }
    }
}

impl From<&str> for VersionTag {
    fn from(tag: &str) -> VersionTag {
        Self { tag: tag.to_string() }
    }
}

impl VersionTag {
    /// Get the inner entity tag, as it should be sent in an `If-Match` header
    pub fn as_str(&self) -> &str {
        &self.tag
    }
}


/// How many matches a search should return
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindScope {
    /// Only the first match (if any)
    First,
    /// Every match, in feed order
    All,
}

impl Default for FindScope {
    fn default() -> Self {
        FindScope::All
    }
}
