//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP fetch behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Directory layout and metadata file location
    #[serde(default)]
    pub paths: PathsConfig,

    /// Change detection settings
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Where the URL list comes from
    #[serde(default)]
    pub source: SourceConfig,

    /// Publishing of diff artifacts over git
    #[serde(default)]
    pub publish: PublishConfig,

    /// Diff artifact rendering settings
    #[serde(default)]
    pub diff: DiffConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.content_selector.trim().is_empty() {
            return Err(AppError::validation("fetch.content_selector is empty"));
        }
        if self.paths.metadata_file.trim().is_empty() {
            return Err(AppError::validation("paths.metadata_file is empty"));
        }
        if self.detector.epoch_sentinel.trim().is_empty() {
            return Err(AppError::validation("detector.epoch_sentinel is empty"));
        }
        if self.diff.render_width == 0 {
            return Err(AppError::validation("diff.render_width must be > 0"));
        }
        match &self.source {
            SourceConfig::File { path } => {
                if path.trim().is_empty() {
                    return Err(AppError::validation("source.path is empty"));
                }
            }
            SourceConfig::Sheet {
                spreadsheet_id,
                range,
                ..
            } => {
                if spreadsheet_id.trim().is_empty() {
                    return Err(AppError::validation("source.spreadsheet_id is empty"));
                }
                if range.trim().is_empty() {
                    return Err(AppError::validation("source.range is empty"));
                }
            }
        }
        if self.publish.enabled && self.publish.remote.trim().is_empty() {
            return Err(AppError::validation("publish.remote is empty"));
        }
        Ok(())
    }
}

/// HTTP fetch behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// CSS selector for the readable content region of HTML pages
    #[serde(default = "defaults::content_selector")]
    pub content_selector: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            content_selector: defaults::content_selector(),
        }
    }
}

/// Directory layout, all relative to the run's base directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Live copies of watched documents
    #[serde(default = "defaults::store_dir")]
    pub store_dir: String,

    /// Dated snapshots of superseded documents
    #[serde(default = "defaults::archive_dir")]
    pub archive_dir: String,

    /// Dated diff artifacts, one folder per document
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,

    /// Daily run logs
    #[serde(default = "defaults::log_dir")]
    pub log_dir: String,

    /// Metadata store file
    #[serde(default = "defaults::metadata_file")]
    pub metadata_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store_dir: defaults::store_dir(),
            archive_dir: defaults::archive_dir(),
            output_dir: defaults::output_dir(),
            log_dir: defaults::log_dir(),
            metadata_file: defaults::metadata_file(),
        }
    }
}

/// Change detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Last-modified value servers send when they have no reliable
    /// modification time; matching responses fall back to hashing.
    #[serde(default = "defaults::epoch_sentinel")]
    pub epoch_sentinel: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            epoch_sentinel: defaults::epoch_sentinel(),
        }
    }
}

/// Where the watched URL list comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Newline-separated URL list in a local file.
    File { path: String },

    /// A single spreadsheet range fetched over the Sheets values API,
    /// one URL per row. The API key is read from the named environment
    /// variable at run time.
    Sheet {
        spreadsheet_id: String,
        range: String,
        #[serde(default = "defaults::api_key_env")]
        api_key_env: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::File {
            path: defaults::source_path(),
        }
    }
}

/// Publishing of diff artifacts over git.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Commit and push at the end of a changed run
    #[serde(default)]
    pub enabled: bool,

    /// Remote to push to
    #[serde(default = "defaults::remote")]
    pub remote: String,

    /// Commit message prefix; the run date is appended
    #[serde(default = "defaults::commit_prefix")]
    pub commit_prefix: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            remote: defaults::remote(),
            commit_prefix: defaults::commit_prefix(),
        }
    }
}

/// Diff artifact rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Unchanged context lines kept around each hunk
    #[serde(default = "defaults::context_lines")]
    pub context_lines: usize,

    /// Pixel width of rendered PDF change images
    #[serde(default = "defaults::render_width")]
    pub render_width: u32,

    /// Syntax theme name embedded in HTML diff pages
    #[serde(default = "defaults::theme")]
    pub theme: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: defaults::context_lines(),
            render_width: defaults::render_width(),
            theme: defaults::theme(),
        }
    }
}

mod defaults {
    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; docwatch/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn content_selector() -> String {
        "#content".into()
    }

    // Path defaults
    pub fn store_dir() -> String {
        "store".into()
    }
    pub fn archive_dir() -> String {
        "old".into()
    }
    pub fn output_dir() -> String {
        "out".into()
    }
    pub fn log_dir() -> String {
        "logs".into()
    }
    pub fn metadata_file() -> String {
        "status.json".into()
    }

    // Detector defaults
    pub fn epoch_sentinel() -> String {
        "Thu, 01 Jan 1970 00:00:00 GMT".into()
    }

    // Source defaults
    pub fn source_path() -> String {
        "urls.txt".into()
    }
    pub fn api_key_env() -> String {
        "SHEETS_API_KEY".into()
    }

    // Publish defaults
    pub fn remote() -> String {
        "origin".into()
    }
    pub fn commit_prefix() -> String {
        "Changes from".into()
    }

    // Diff defaults
    pub fn context_lines() -> usize {
        3
    }
    pub fn render_width() -> u32 {
        1920
    }
    pub fn theme() -> String {
        "vs".into()
    }
}
