//! Per-resource tracking state and the in-memory metadata store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Recorded observation state for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Server-supplied last-modified string, compared for equality only
    pub modified: String,

    /// MD5 hex digest of the stored file bytes
    pub hash: String,
}

/// In-memory view of the metadata file.
///
/// Keys are stored filenames. A `BTreeMap` keeps the serialized JSON
/// deterministic. Entries are never removed; state for URLs dropped
/// from the watch list stays behind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataStore {
    entries: BTreeMap<String, ResourceState>,

    #[serde(skip)]
    dirty: bool,
}

impl MetadataStore {
    /// State recorded for a filename, if any.
    pub fn get(&self, filename: &str) -> Option<&ResourceState> {
        self.entries.get(filename)
    }

    /// Record a full state for a filename, marking the store dirty.
    pub fn insert(&mut self, filename: impl Into<String>, state: ResourceState) {
        self.entries.insert(filename.into(), state);
        self.dirty = true;
    }

    /// Update the recorded last-modified string for an existing entry.
    pub fn set_modified(&mut self, filename: &str, modified: impl Into<String>) {
        if let Some(state) = self.entries.get_mut(filename) {
            state.modified = modified.into();
            self.dirty = true;
        }
    }

    /// Update the recorded content hash for an existing entry.
    pub fn set_hash(&mut self, filename: &str, hash: impl Into<String>) {
        if let Some(state) = self.entries.get_mut(filename) {
            state.hash = hash.into();
            self.dirty = true;
        }
    }

    /// Whether any entry changed since load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forget the dirty flag after a successful save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// All entries, sorted by filename.
    pub fn entries(&self) -> &BTreeMap<String, ResourceState> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
