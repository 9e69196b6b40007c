//! This module implements the CLI interface for drive-bucket: command parsing,
//! environment loading and the scheduled entrypoint.
//!
//! All sync logic (walker, listing, transfer, clients) lives in the
//! [`drive-bucket-core`] crate. This module wires the real clients together
//! from the environment and reports the outcome.
//!
//! ## How To Use
//! - From a scheduler: `drive-bucket sync`, once a day. Exit code 0 means every
//!   fresh file was mirrored; anything else means the run failed.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`drive-bucket-core`]: ../../drive-bucket-core/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drive_bucket_core::config::SyncSettings;
use drive_bucket_core::drive::{GoogleDriveClient, ServiceAccountTokenSource};
use drive_bucket_core::storage::OpendalStore;
use drive_bucket_core::synchronise::SyncManager;

/// CLI for drive-bucket: mirror a Google Drive folder into an S3 bucket.
#[derive(Parser)]
#[clap(
    name = "drive-bucket",
    version,
    about = "Mirror recently changed Google Drive files into an S3 bucket"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one sync of the configured root folder
    Sync {
        /// Read settings from this env file instead of `./.env`
        #[clap(long)]
        env_file: Option<PathBuf>,
    },
}

/// Loads `.env` (or the given file) into the process environment.
///
/// A missing default `.env` is fine; a missing explicit file is an error.
pub fn load_env(env_file: Option<&PathBuf>) -> Result<()> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

/// Runs one sync with settings already validated.
pub async fn sync(settings: &SyncSettings) -> Result<()> {
    tracing::info!("Starting sync process");

    let tokens = ServiceAccountTokenSource::new(&settings.service_account).await?;
    let drive = GoogleDriveClient::new(Arc::new(tokens));
    let store = OpendalStore::s3(&settings.storage)?;
    let manager = SyncManager::new(drive, store, settings.nesting_level_limit);

    match manager.run(&settings.root_folder_id).await {
        Ok(report) => {
            tracing::info!(
                folders = report.folders_visited,
                transferred = report.transferred.len(),
                skipped = report.skipped.len(),
                "Sync completed successfully"
            );
            tracing::debug!(?report, "Sync report");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Error during sync");
            Err(anyhow::Error::new(e).context("Sync failed"))
        }
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main().
///
/// Loads `--env-file` (or `./.env`) first. Variables already set in the
/// process win over file entries.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync { env_file } => {
            load_env(env_file.as_ref())?;
            let settings = SyncSettings::from_env().map_err(|e| {
                tracing::error!(error = %e, "Invalid configuration");
                e
            })?;
            settings.trace_loaded();
            sync(&settings).await
        }
    }
}
