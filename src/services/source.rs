// src/services/source.rs

//! Watched URL list retrieval.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Ordered URL list, fetched once per run. Implementations return the
/// URLs in source order; blank entries are already filtered out.
#[async_trait]
pub trait UrlSource: Send + Sync {
    async fn urls(&self) -> Result<Vec<String>>;
}

/// Build the configured source. Relative file paths resolve against
/// the base directory.
pub fn from_config(
    config: &SourceConfig,
    base: &Path,
    client: reqwest::Client,
) -> Box<dyn UrlSource> {
    match config {
        SourceConfig::File { path } => Box::new(FileUrlSource::new(base.join(path))),
        SourceConfig::Sheet {
            spreadsheet_id,
            range,
            api_key_env,
        } => Box::new(SheetUrlSource::new(
            client,
            spreadsheet_id.clone(),
            range.clone(),
            api_key_env.clone(),
        )),
    }
}

/// Newline-separated URL list in a local file.
pub struct FileUrlSource {
    path: PathBuf,
}

impl FileUrlSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl UrlSource for FileUrlSource {
    async fn urls(&self) -> Result<Vec<String>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| AppError::source(format!("cannot read {}: {e}", self.path.display())))?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// One spreadsheet range over the Sheets values endpoint, one URL per
/// row (first cell). Only a key-authenticated read; anything beyond
/// that belongs to the spreadsheet service, not here.
pub struct SheetUrlSource {
    client: reqwest::Client,
    spreadsheet_id: String,
    range: String,
    api_key_env: String,
}

impl SheetUrlSource {
    pub fn new(
        client: reqwest::Client,
        spreadsheet_id: String,
        range: String,
        api_key_env: String,
    ) -> Self {
        Self {
            client,
            spreadsheet_id,
            range,
            api_key_env,
        }
    }

    fn values_url(&self, key: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}?key={}",
            self.spreadsheet_id, self.range, key
        )
    }

    /// First cell of each row of a values response, blanks skipped.
    fn parse_values(body: &serde_json::Value) -> Vec<String> {
        body.get("values")
            .and_then(|v| v.as_array())
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.get(0))
                    .filter_map(|cell| cell.as_str())
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl UrlSource for SheetUrlSource {
    async fn urls(&self) -> Result<Vec<String>> {
        let key = std::env::var(&self.api_key_env)
            .map_err(|_| AppError::source(format!("{} is not set", self.api_key_env)))?;

        let body: serde_json::Value = self
            .client
            .get(self.values_url(&key))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Self::parse_values(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_source_skips_blanks() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("urls.txt");
        tokio::fs::write(&path, "http://x/a.html\n\n  \nhttp://x/b.pdf\n")
            .await
            .unwrap();

        let urls = FileUrlSource::new(&path).urls().await.unwrap();
        assert_eq!(urls, vec!["http://x/a.html", "http://x/b.pdf"]);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = FileUrlSource::new(tmp.path().join("absent.txt"))
            .urls()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Source(_)));
    }

    #[test]
    fn test_parse_values_first_cells() {
        let body = serde_json::json!({
            "range": "Sheet1!A2:A",
            "values": [
                ["http://x/a.html", "note"],
                [],
                ["  "],
                ["http://x/b.pdf"]
            ]
        });
        assert_eq!(
            SheetUrlSource::parse_values(&body),
            vec!["http://x/a.html", "http://x/b.pdf"]
        );
    }

    #[test]
    fn test_parse_values_missing_key() {
        let body = serde_json::json!({ "range": "Sheet1!A2:A" });
        assert!(SheetUrlSource::parse_values(&body).is_empty());
    }

    #[test]
    fn test_values_url_shape() {
        let source = SheetUrlSource::new(
            reqwest::Client::new(),
            "sheet123".into(),
            "Watch!A2:A".into(),
            "SHEETS_API_KEY".into(),
        );
        assert_eq!(
            source.values_url("k"),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet123/values/Watch!A2:A?key=k"
        );
    }

    #[test]
    fn test_from_config_file_resolves_relative() {
        let config = SourceConfig::File {
            path: "urls.txt".into(),
        };
        // Just exercise the constructor arm; behavior is covered above.
        let _source = from_config(&config, Path::new("/base"), reqwest::Client::new());
    }
}
