// src/services/fetch.rs

//! Document retrieval.
//!
//! A `DocumentFetcher` answers two questions per watched URL: what the
//! server reports as `Last-Modified`, and what the storable body is.
//! HTML bodies are reduced to the readable text of the configured
//! content region; PDF bodies stay raw.

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{FetchConfig, ResourceKind};
use crate::utils::http::create_async_client;

/// Body of a fetched document, ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBody {
    /// Readable text extracted from the content region of an HTML page
    Text(String),
    /// Raw PDF bytes
    Binary(Vec<u8>),
}

impl DocumentBody {
    /// Bytes as persisted in the live store.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// Retrieves headers and bodies for watched documents.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// The resource's `Last-Modified` header, via a HEAD request.
    async fn last_modified(&self, url: &str) -> Result<String>;

    /// The resource's full body.
    async fn fetch_body(&self, url: &str, kind: ResourceKind) -> Result<DocumentBody>;
}

/// HTTP-backed fetcher.
pub struct HttpFetcher {
    client: reqwest::Client,
    content_selector: String,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            content_selector: config.content_selector.clone(),
        })
    }

    /// Readable text of the content region: every non-blank text piece
    /// inside the selector match, trimmed, one per line.
    fn extract_text(&self, url: &str, html: &str) -> Result<String> {
        let selector = Selector::parse(&self.content_selector)
            .map_err(|e| AppError::selector(&self.content_selector, format!("{e:?}")))?;
        let document = Html::parse_document(html);

        let region = document.select(&selector).next().ok_or_else(|| {
            AppError::extraction(url, format!("no '{}' region", self.content_selector))
        })?;

        let lines: Vec<&str> = region
            .text()
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .collect();
        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn last_modified(&self, url: &str) -> Result<String> {
        let response = self.client.head(url).send().await?.error_for_status()?;
        let header = response
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::missing_header(url, "Last-Modified"))?;
        Ok(header.to_string())
    }

    async fn fetch_body(&self, url: &str, kind: ResourceKind) -> Result<DocumentBody> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        match kind {
            ResourceKind::Html => {
                let html = response.text().await?;
                Ok(DocumentBody::Text(self.extract_text(url, &html)?))
            }
            ResourceKind::Pdf => {
                let bytes = response.bytes().await?;
                Ok(DocumentBody::Binary(bytes.to_vec()))
            }
        }
    }
}
