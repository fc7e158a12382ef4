// src/pipeline/run.rs

//! One full watch run.

use log::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{Config, PublishOutcome, RunEvent, RunReport};
use crate::pipeline::detect::ChangeDetector;
use crate::pipeline::diff::DiffGenerator;
use crate::pipeline::publish::DiffPublisher;
use crate::services::{DocumentFetcher, UrlSource};
use crate::storage::FileStore;
use crate::utils::filename_for_url;

/// Run the watcher over the configured URL list.
///
/// Sequence: load metadata → per-URL change detection in source order →
/// persist metadata once if dirty → publish once if any diff was
/// produced → always write the daily log. The date stamp is captured by
/// the caller once at run start.
pub async fn run_watch(
    config: &Config,
    store: &FileStore,
    fetcher: &dyn DocumentFetcher,
    source: &dyn UrlSource,
    publisher: Option<&dyn DiffPublisher>,
    date: &str,
) -> Result<RunReport> {
    let mut meta = store.load_metadata().await?.ok_or_else(|| {
        AppError::config(format!(
            "metadata store not found at {}; run 'init' first",
            store.paths().metadata_file().display()
        ))
    })?;
    store.ensure_layout().await?;

    let urls = source.urls().await?;
    info!("Watching {} URLs", urls.len());

    let differ = DiffGenerator::new(&config.diff);
    let detector = ChangeDetector::new(
        fetcher,
        store,
        &differ,
        &config.detector.epoch_sentinel,
        date,
    );

    let mut report = RunReport::new(date);
    for url in &urls {
        match detector.process_url(url, &mut meta).await {
            Ok(Some(event)) => report.record(event),
            Ok(None) => {}
            Err(e) => {
                // One bad resource never aborts the run.
                let filename = filename_for_url(url).unwrap_or_else(|_| url.clone());
                warn!("Failed {filename}: {e}");
                report.record(RunEvent::Failed {
                    filename,
                    message: e.to_string(),
                });
            }
        }
    }

    if meta.is_dirty() {
        store.save_metadata(&meta).await?;
        meta.mark_clean();
        info!("Metadata saved ({} entries)", meta.len());
    } else {
        report.mark_no_changes();
        info!("No changes detected");
    }

    if report.files_changed() {
        if let Some(publisher) = publisher {
            match publisher.publish(date) {
                Ok(()) => report.mark_publish(PublishOutcome::Pushed),
                Err(e) => {
                    warn!("Publish failed: {e}");
                    report.mark_publish(PublishOutcome::Failed);
                }
            }
        }
    }

    store.write_daily_log(date, &report.log_text()).await?;
    Ok(report)
}
