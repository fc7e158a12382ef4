// src/storage/mod.rs

//! Filesystem layout and persistence.
//!
//! ## Storage Layout
//!
//! ```text
//! {base}/
//! ├── status.json           # Metadata store (filename → modified/hash)
//! ├── store/                # Live copies of watched documents
//! ├── old/                  # Superseded snapshots
//! │   └── YYYY-MM-DD/
//! ├── out/                  # Diff artifacts
//! │   └── {stem}/
//! │       └── YYYY-MM-DD.{html,png}
//! └── logs/
//!     └── YYYY-MM-DD.txt
//! ```

mod local;

pub use local::FileStore;

use std::path::{Path, PathBuf};

use crate::models::{PathsConfig, artifact_stem};

/// Resolved directory layout for one run, rooted at a base directory.
#[derive(Debug, Clone)]
pub struct StorePaths {
    base: PathBuf,
    store_dir: PathBuf,
    archive_dir: PathBuf,
    output_dir: PathBuf,
    log_dir: PathBuf,
    metadata_file: PathBuf,
}

impl StorePaths {
    /// Resolve the configured relative layout against a base directory.
    pub fn resolve(base: impl Into<PathBuf>, config: &PathsConfig) -> Self {
        let base = base.into();
        Self {
            store_dir: base.join(&config.store_dir),
            archive_dir: base.join(&config.archive_dir),
            output_dir: base.join(&config.output_dir),
            log_dir: base.join(&config.log_dir),
            metadata_file: base.join(&config.metadata_file),
            base,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn metadata_file(&self) -> &Path {
        &self.metadata_file
    }

    /// Live copy of a stored file.
    pub fn live_file(&self, filename: &str) -> PathBuf {
        self.store_dir.join(filename)
    }

    /// Temporary landing spot for a freshly fetched body, next to the
    /// live copy so the promotion rename stays on one filesystem.
    pub fn temp_file(&self, filename: &str) -> PathBuf {
        self.store_dir.join(format!("{filename}.tmp"))
    }

    /// Dated archive directory for one run day.
    pub fn archive_day_dir(&self, date: &str) -> PathBuf {
        self.archive_dir.join(date)
    }

    /// Archived snapshot path for a filename on a given day.
    pub fn archived_file(&self, date: &str, filename: &str) -> PathBuf {
        self.archive_day_dir(date).join(filename)
    }

    /// Per-resource output folder, named by the filename's stem.
    pub fn item_folder(&self, filename: &str) -> PathBuf {
        self.output_dir.join(artifact_stem(filename))
    }

    /// Daily log file path.
    pub fn log_file(&self, date: &str) -> PathBuf {
        self.log_dir.join(format!("{date}.txt"))
    }
}
