//! High-level pipeline: walks a Drive folder tree and mirrors it into a bucket.
//!
//! This module provides the top-level orchestration of a sync run. Starting from
//! the root folder it:
//!   - Lists each folder's children through [`listing::list_folder_contents`]
//!   - Recurses into subfolders, up to the configured nesting limit
//!   - Hands every file to the [`Transferrer`], which exports or downloads it and
//!     streams it into the [`ObjectStore`]
//!   - Collects a [`SyncReport`] of what was uploaded and what was skipped
//!
//! # Responsibilities
//! - Strictly sequential: one folder listing or file transfer at a time, in
//!   listing order, depth first
//! - Fail-fast: any remote failure ends the run with that error
//! - Recoverable conditions (malformed entries, folders past the nesting limit,
//!   native types without an export format) are logged, recorded and skipped
//!
//! # Object keys
//! A file's key is its ancestor folder names below the root joined by `/`,
//! followed by its own name. Re-running over an unchanged tree produces the
//! same keys, so the bucket is overwritten rather than duplicated.
//!
//! # Navigation
//! - Main entrypoint: [`SyncManager::run`]
//! - Supporting types: [`SyncReport`], [`SkippedItem`].

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info};

use crate::contract::{DriveClient, DriveItem, ObjectStore, UploadReceipt};
use crate::error::Result;
use crate::export_formats::{is_folder, SkipReason};
use crate::listing;
use crate::transfer::{TransferOutcome, TransferRequest, Transferrer};

/// Outcome of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub folders_visited: usize,
    pub transferred: Vec<UploadReceipt>,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// Folder path of the item, including its own name when known.
    pub path: String,
    pub reason: SkipReason,
}

impl SyncReport {
    pub fn keys(&self) -> Vec<&str> {
        self.transferred.iter().map(|t| t.key.as_str()).collect()
    }
}

/// Walks one Drive tree into one bucket.
pub struct SyncManager<D, S> {
    drive: D,
    store: S,
    nesting_limit: usize,
}

impl<D, S> SyncManager<D, S>
where
    D: DriveClient,
    S: ObjectStore,
{
    pub fn new(drive: D, store: S, nesting_limit: usize) -> Self {
        Self {
            drive,
            store,
            nesting_limit,
        }
    }

    /// Mirrors everything below `root_folder_id` that is fresh as of now.
    pub async fn run(&self, root_folder_id: &str) -> Result<SyncReport> {
        self.run_at(root_folder_id, Utc::now()).await
    }

    /// Like [`run`](Self::run), with the freshness window anchored to `now`.
    pub async fn run_at(&self, root_folder_id: &str, now: DateTime<Utc>) -> Result<SyncReport> {
        let cutoff = listing::freshness_cutoff(now);
        info!(
            root_folder_id,
            nesting_limit = self.nesting_limit,
            cutoff = %cutoff,
            "[SYNC] Starting folder walk"
        );

        let mut report = SyncReport::default();
        self.sync_folder(root_folder_id, &[], cutoff, &mut report)
            .await?;

        info!(
            folders = report.folders_visited,
            transferred = report.transferred.len(),
            skipped = report.skipped.len(),
            "[SYNC] Folder walk complete"
        );
        Ok(report)
    }

    /// Syncs the children of `folder_id`, which sits at `path` below the root.
    pub fn sync_folder<'a>(
        &'a self,
        folder_id: &'a str,
        path: &'a [String],
        cutoff: DateTime<Utc>,
        report: &'a mut SyncReport,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            if path.is_empty() {
                info!("Entering root folder");
            } else {
                info!("Entering folder: {}", path.join("/"));
            }
            report.folders_visited += 1;

            let items = listing::list_folder_contents(&self.drive, folder_id, cutoff).await?;
            info!(folder_id, count = items.len(), "Items in folder");
            debug!(?items, "Items in folder (full debug)");

            for item in items {
                let (id, name, mime_type) = match complete_entry(&item) {
                    Some(fields) => fields,
                    None => {
                        info!(
                            ?item,
                            "Skipping item because `id`, `name` or `mimeType` is missing"
                        );
                        report.skipped.push(SkippedItem {
                            path: child_path(path, item.name.as_deref()),
                            reason: SkipReason::MalformedEntry,
                        });
                        continue;
                    }
                };

                if is_folder(mime_type) {
                    let mut child = path.to_vec();
                    child.push(name.to_string());

                    if child.len() > self.nesting_limit {
                        info!(
                            current_path = %child.join("/"),
                            nesting_limit = self.nesting_limit,
                            "Skipping folder because nesting limit reached"
                        );
                        report.skipped.push(SkippedItem {
                            path: child.join("/"),
                            reason: SkipReason::NestingLimit,
                        });
                        continue;
                    }

                    self.sync_folder(id, &child, cutoff, report).await?;
                } else {
                    info!(file_id = id, file_name = name, mime_type, "Processing file");

                    let request = TransferRequest {
                        file_id: id.to_string(),
                        file_name: name.to_string(),
                        file_mime_type: mime_type.to_string(),
                        folder_path: path.join("/"),
                    };

                    match Transferrer::new(&self.drive, &self.store)
                        .transfer(&request)
                        .await?
                    {
                        TransferOutcome::Uploaded(receipt) => {
                            report.transferred.push(receipt);
                        }
                        TransferOutcome::Skipped { reason } => {
                            report.skipped.push(SkippedItem {
                                path: child_path(path, Some(name)),
                                reason,
                            });
                        }
                    }
                }
            }

            Ok(())
        }
        .boxed()
    }
}

fn complete_entry(item: &DriveItem) -> Option<(&str, &str, &str)> {
    let id = item.id.as_deref().filter(|s| !s.is_empty())?;
    let name = item.name.as_deref().filter(|s| !s.is_empty())?;
    let mime_type = item.mime_type.as_deref().filter(|s| !s.is_empty())?;
    Some((id, name, mime_type))
}

fn child_path(path: &[String], name: Option<&str>) -> String {
    let mut segments: Vec<&str> = path.iter().map(String::as_str).collect();
    if let Some(name) = name {
        segments.push(name);
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_entry_requires_all_fields() {
        let mut item = DriveItem::new("id", "name", "text/plain");
        assert_eq!(complete_entry(&item), Some(("id", "name", "text/plain")));

        item.name = None;
        assert_eq!(complete_entry(&item), None);

        item.name = Some(String::new());
        assert_eq!(complete_entry(&item), None);
    }

    #[test]
    fn test_child_path() {
        let path = vec!["a".to_string(), "b".to_string()];

        assert_eq!(child_path(&path, Some("c")), "a/b/c");
        assert_eq!(child_path(&path, None), "a/b");
        assert_eq!(child_path(&[], Some("c")), "c");
    }
}
