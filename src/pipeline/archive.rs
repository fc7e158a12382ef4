// src/pipeline/archive.rs

//! Snapshot rotation for changed documents.

use std::path::PathBuf;

use crate::error::Result;
use crate::storage::StorePaths;

/// Paths of a rotated pair: the archived old copy and the promoted
/// live copy. The differ reads both by path.
#[derive(Debug)]
pub struct ArchivedPair {
    pub old: PathBuf,
    pub new: PathBuf,
}

/// Moves superseded files into the dated archive and promotes fetched
/// temp files into the live store.
pub struct Archiver<'a> {
    paths: &'a StorePaths,
    date: &'a str,
}

impl<'a> Archiver<'a> {
    pub fn new(paths: &'a StorePaths, date: &'a str) -> Self {
        Self { paths, date }
    }

    /// Rotate one filename: live goes to `old/<date>/<name>`, then the
    /// temp file takes its place. Both moves are renames, so old and
    /// new stay on the same filesystem and the window without a live
    /// file is as small as rename allows.
    pub async fn archive_and_promote(&self, filename: &str) -> Result<ArchivedPair> {
        let live = self.paths.live_file(filename);
        let temp = self.paths.temp_file(filename);
        let archived = self.paths.archived_file(self.date, filename);

        tokio::fs::create_dir_all(self.paths.archive_day_dir(self.date)).await?;
        tokio::fs::rename(&live, &archived).await?;
        tokio::fs::rename(&temp, &live).await?;

        Ok(ArchivedPair {
            old: archived,
            new: live,
        })
    }
}
