// src/pipeline/detect.rs

//! Per-URL change detection.
//!
//! Each URL resolves to one of four outcomes against the stored state:
//! unseen (store the baseline), unchanged header (skip, HEAD only),
//! stale sentinel (header untrusted, verify by hash), or changed
//! header (record the new header, verify by hash). Hash verification
//! fetches into a temp file and either discards it or rotates it into
//! the live store through the archiver.

use log::{debug, info};

use crate::error::Result;
use crate::models::{MetadataStore, ResourceKind, ResourceState, RunEvent};
use crate::pipeline::archive::Archiver;
use crate::pipeline::diff::DiffGenerator;
use crate::services::DocumentFetcher;
use crate::storage::FileStore;
use crate::utils::filename_for_url;
use crate::utils::hash::{hash_file, md5_hex};

/// Outcome of comparing a fetched header against stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No entry for this filename yet
    Unseen,
    /// Header equals the epoch sentinel; it cannot be trusted
    StaleSentinel,
    /// Header equals the stored value
    Unchanged,
    /// Header differs from the stored value
    HeaderChanged,
}

/// Classify one observation. `Unseen` wins over the sentinel check so
/// a first sighting is always stored as a baseline.
pub fn classify(
    stored: Option<&ResourceState>,
    modified: &str,
    sentinel: &str,
) -> Classification {
    match stored {
        None => Classification::Unseen,
        Some(_) if modified == sentinel => Classification::StaleSentinel,
        Some(state) if state.modified == modified => Classification::Unchanged,
        Some(_) => Classification::HeaderChanged,
    }
}

/// Drives fetch, hash comparison, archival and diffing for one URL at
/// a time.
pub struct ChangeDetector<'a> {
    fetcher: &'a dyn DocumentFetcher,
    store: &'a FileStore,
    differ: &'a DiffGenerator,
    sentinel: &'a str,
    date: &'a str,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(
        fetcher: &'a dyn DocumentFetcher,
        store: &'a FileStore,
        differ: &'a DiffGenerator,
        sentinel: &'a str,
        date: &'a str,
    ) -> Self {
        Self {
            fetcher,
            store,
            differ,
            sentinel,
            date,
        }
    }

    /// Process one URL against the metadata store. Returns the event
    /// to record, or `None` when nothing noteworthy happened.
    pub async fn process_url(
        &self,
        url: &str,
        meta: &mut MetadataStore,
    ) -> Result<Option<RunEvent>> {
        let filename = filename_for_url(url)?;
        let kind = ResourceKind::from_filename(&filename);
        let modified = self.fetcher.last_modified(url).await?;

        match classify(meta.get(&filename), &modified, self.sentinel) {
            Classification::Unseen => {
                let body = self.fetcher.fetch_body(url, kind).await?;
                let live = self.store.paths().live_file(&filename);
                self.store.write_document(&live, body.as_bytes()).await?;

                let hash = md5_hex(body.as_bytes());
                meta.insert(filename.clone(), ResourceState { modified, hash });
                info!("Added: {filename}");
                Ok(Some(RunEvent::Added { filename }))
            }
            Classification::Unchanged => {
                debug!("Unchanged: {filename}");
                Ok(None)
            }
            Classification::StaleSentinel => {
                debug!("Sentinel header for {filename}; comparing hashes");
                self.verify_by_hash(url, &filename, kind, meta).await
            }
            Classification::HeaderChanged => {
                // The header update persists even when the content
                // turns out to be identical.
                meta.set_modified(&filename, &modified);
                self.verify_by_hash(url, &filename, kind, meta).await
            }
        }
    }

    /// Fetch into a temp file and compare digests. Equal content
    /// discards the temp file; differing content rotates it into the
    /// live store and renders the dated diff artifact.
    async fn verify_by_hash(
        &self,
        url: &str,
        filename: &str,
        kind: ResourceKind,
        meta: &mut MetadataStore,
    ) -> Result<Option<RunEvent>> {
        let body = self.fetcher.fetch_body(url, kind).await?;
        let temp = self.store.paths().temp_file(filename);
        self.store.write_document(&temp, body.as_bytes()).await?;

        let new_hash = hash_file(&temp).await?;
        let stored_hash = meta
            .get(filename)
            .map(|state| state.hash.clone())
            .unwrap_or_default();

        if new_hash == stored_hash {
            debug!("Hash unchanged for {filename}");
            self.store.discard(&temp).await?;
            return Ok(None);
        }

        let pair = Archiver::new(self.store.paths(), self.date)
            .archive_and_promote(filename)
            .await?;
        self.differ
            .generate(self.store.paths(), filename, self.date, &pair.old, &pair.new)
            .await?;
        meta.set_hash(filename, new_hash);

        info!("Updated: {filename}");
        Ok(Some(RunEvent::Changed {
            filename: filename.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

    fn stored(modified: &str) -> ResourceState {
        ResourceState {
            modified: modified.to_string(),
            hash: "abc".to_string(),
        }
    }

    #[test]
    fn classify_unseen_wins() {
        assert_eq!(
            classify(None, "Mon, 02 Jan 2023 00:00:00 GMT", SENTINEL),
            Classification::Unseen
        );
        // Even a sentinel header stores a baseline on first sight
        assert_eq!(classify(None, SENTINEL, SENTINEL), Classification::Unseen);
    }

    #[test]
    fn classify_sentinel_before_equality() {
        // A stored sentinel matching a fetched sentinel must still
        // fall back to hashing, not be treated as unchanged.
        assert_eq!(
            classify(Some(&stored(SENTINEL)), SENTINEL, SENTINEL),
            Classification::StaleSentinel
        );
        assert_eq!(
            classify(Some(&stored("Mon, 02 Jan 2023 00:00:00 GMT")), SENTINEL, SENTINEL),
            Classification::StaleSentinel
        );
    }

    #[test]
    fn classify_unchanged_and_changed() {
        let state = stored("Mon, 02 Jan 2023 00:00:00 GMT");
        assert_eq!(
            classify(Some(&state), "Mon, 02 Jan 2023 00:00:00 GMT", SENTINEL),
            Classification::Unchanged
        );
        assert_eq!(
            classify(Some(&state), "Tue, 03 Jan 2023 00:00:00 GMT", SENTINEL),
            Classification::HeaderChanged
        );
    }
}
