// src/pipeline/diff.rs

//! Diff artifact generation, dispatched on resource kind.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{DiffConfig, ResourceKind};
use crate::pipeline::html_diff::{self, HtmlDiffOptions};
use crate::pipeline::pdf_diff::{self, PdfRenderOptions};
use crate::storage::StorePaths;

/// Produces the dated diff artifact for a changed document.
pub struct DiffGenerator {
    html: HtmlDiffOptions,
    pdf: PdfRenderOptions,
}

impl DiffGenerator {
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            html: HtmlDiffOptions::from_config(config),
            pdf: PdfRenderOptions::from_config(config),
        }
    }

    /// Render the artifact for one changed file and return its path:
    /// `out/<stem>/<date>.html` for text documents, `.png` for PDFs.
    /// A same-day re-run overwrites the day's artifact.
    pub async fn generate(
        &self,
        paths: &StorePaths,
        filename: &str,
        date: &str,
        old_path: &Path,
        new_path: &Path,
    ) -> Result<PathBuf> {
        let folder = paths.item_folder(filename);
        tokio::fs::create_dir_all(&folder).await?;

        match ResourceKind::from_filename(filename) {
            ResourceKind::Html => {
                let old = tokio::fs::read_to_string(old_path).await?;
                let new = tokio::fs::read_to_string(new_path).await?;
                let page = html_diff::render_page(filename, date, &old, &new, &self.html);

                let artifact = folder.join(format!("{date}.html"));
                tokio::fs::write(&artifact, page.as_bytes()).await?;
                Ok(artifact)
            }
            ResourceKind::Pdf => {
                let old = tokio::fs::read(old_path).await?;
                let new = tokio::fs::read(new_path).await?;
                let set = pdf_diff::changes_between(&old, &new)?;
                let img = pdf_diff::render_change_image(&set, &self.pdf);

                let mut png = Vec::new();
                img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

                let artifact = folder.join(format!("{date}.png"));
                tokio::fs::write(&artifact, &png).await?;
                Ok(artifact)
            }
        }
    }
}
