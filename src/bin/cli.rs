//! docwatch CLI
//!
//! Local execution entry point for scheduled (cron) runs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docwatch::{
    error::Result,
    models::{Config, MetadataStore},
    pipeline::{self, DiffPublisher, GitPublisher},
    services::{HttpFetcher, source},
    storage::{FileStore, StorePaths},
    utils::{http, today_stamp},
};

/// docwatch - Remote document change watcher
#[derive(Parser, Debug)]
#[command(
    name = "docwatch",
    version,
    about = "Watches remote documents and publishes dated diffs"
)]
struct Cli {
    /// Base directory holding config.toml, the metadata store and all
    /// output roots
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one watch pass over the configured URL list
    Run,

    /// Create the directory roots and an empty metadata store
    Init {
        /// Recreate the metadata store even if one exists
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show metadata store and layout info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.base_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);

    let store = FileStore::new(StorePaths::resolve(&cli.base_dir, &config.paths));

    match cli.command {
        Command::Run => {
            config.validate()?;

            let fetcher = HttpFetcher::new(&config.fetch)?;
            let client = http::create_async_client(&config.fetch)?;
            let url_source = source::from_config(&config.source, &cli.base_dir, client);
            let publisher = config
                .publish
                .enabled
                .then(|| GitPublisher::new(store.paths(), &config.publish));

            let date = today_stamp();
            let report = pipeline::run_watch(
                &config,
                &store,
                &fetcher,
                url_source.as_ref(),
                publisher.as_ref().map(|p| p as &dyn DiffPublisher),
                &date,
            )
            .await?;

            log::info!(
                "Run complete: {} added, {} changed, {} failed",
                report.added_count(),
                report.changed_count(),
                report.failed_count()
            );
            log::info!("Log written to {}", store.paths().log_file(&date).display());
        }

        Command::Init { force } => {
            let metadata_path = store.paths().metadata_file();
            if metadata_path.exists() && !force {
                log::warn!(
                    "Metadata store already exists at {}. Use --force to recreate.",
                    metadata_path.display()
                );
                return Ok(());
            }

            store.ensure_layout().await?;
            store.save_metadata(&MetadataStore::default()).await?;
            log::info!("Initialized store at {}", cli.base_dir.display());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info => {
            log::info!("Base directory: {}", cli.base_dir.display());
            log::info!(
                "Config file: {}",
                if config_path.exists() {
                    "exists"
                } else {
                    "not found (defaults in use)"
                }
            );

            match store.load_metadata().await? {
                Some(meta) => {
                    log::info!("Metadata store: {} entries", meta.len());
                    for (filename, state) in meta.entries() {
                        log::info!("  {} (modified: {})", filename, state.modified);
                    }
                }
                None => log::info!("Metadata store: not found. Run 'init' first."),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
