//! Copies a single Drive file into the bucket.

use tracing::{info, warn};

use crate::contract::{DriveClient, ObjectStore, UploadReceipt, UploadRequest};
use crate::error::Result;
use crate::export_formats::{plan_transfer, SkipReason, TransferPlan};

/// One file to copy, as found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub file_id: String,
    pub file_name: String,
    pub file_mime_type: String,
    /// Ancestor folder names joined by `/`; empty for files in the root folder.
    pub folder_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Uploaded(UploadReceipt),
    Skipped { reason: SkipReason },
}

/// Object key for `file_name` inside `folder_path`.
pub fn destination_key(folder_path: &str, file_name: &str) -> String {
    if folder_path.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", folder_path, file_name)
    }
}

/// Moves bytes from a [`DriveClient`] into an [`ObjectStore`].
pub struct Transferrer<'a, D: ?Sized, S: ?Sized> {
    drive: &'a D,
    store: &'a S,
}

impl<'a, D, S> Transferrer<'a, D, S>
where
    D: DriveClient + ?Sized,
    S: ObjectStore + ?Sized,
{
    pub fn new(drive: &'a D, store: &'a S) -> Self {
        Self { drive, store }
    }

    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferOutcome> {
        let key = destination_key(&request.folder_path, &request.file_name);
        info!(folder_path = %request.folder_path, key = %key, "Uploading file: {}", key);

        let (body, content_type) = match plan_transfer(&request.file_mime_type) {
            TransferPlan::Skipped { reason } => {
                warn!(
                    key = %key,
                    mime_type = %request.file_mime_type,
                    "Skipping file download for mimeType: {} because no export format found",
                    request.file_mime_type
                );
                return Ok(TransferOutcome::Skipped { reason });
            }
            TransferPlan::Export { export_mime_type } => {
                let body = self.drive.export(&request.file_id, export_mime_type).await?;
                (body, export_mime_type.to_string())
            }
            TransferPlan::DirectDownload { content_type } => {
                let body = self.drive.download(&request.file_id).await?;
                (body, content_type)
            }
        };

        let receipt = self
            .store
            .upload(UploadRequest { key, content_type }, body)
            .await?;

        info!(
            key = %receipt.key,
            bytes = receipt.bytes,
            parts = receipt.parts,
            "Uploaded file: {}",
            receipt.key
        );
        Ok(TransferOutcome::Uploaded(receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_in_root() {
        assert_eq!(destination_key("", "notes.txt"), "notes.txt");
    }

    #[test]
    fn test_key_single_segment() {
        assert_eq!(destination_key("Archive", "old.pdf"), "Archive/old.pdf");
    }

    #[test]
    fn test_key_nested() {
        assert_eq!(destination_key("a/b/c", "d.png"), "a/b/c/d.png");
    }
}
