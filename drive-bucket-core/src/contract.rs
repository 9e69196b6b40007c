//! # contract: the two outbound seams of a sync run
//!
//! A run only ever talks to two remote systems: the Drive API it reads from and
//! the object store it writes to. Both are expressed as async traits here so
//! the walker can be driven by real clients in production and by `mockall`
//! mocks in tests.
//!
//! ## Interface
//! - [`DriveClient`]: one page of a filtered folder listing, a direct media
//!   download, and a format-converting export.
//! - [`ObjectStore`]: a streamed multi-part upload under a slash-delimited key.
//!
//! ## Data
//! - [`DriveItem`] mirrors the four listing fields the run asks for. Every field
//!   is optional because the API may omit them; the walker skips such entries.
//! - [`ByteStream`] carries file content from the Drive side to the store
//!   without buffering whole files in memory.
//!
//! ## Mocking & Testing
//! Both traits are annotated for `mockall` under `cfg(test)` and the
//! `test-export-mocks` feature, so integration tests can build `MockDriveClient`
//! and `MockObjectStore`.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::SyncError;

/// File content flowing from Drive to the bucket.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, SyncError>> + Send>>;

/// One entry of a folder listing.
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub trashed: Option<bool>,
}

impl DriveItem {
    /// Builds a complete, non-trashed entry.
    pub fn new(id: &str, name: &str, mime_type: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            mime_type: Some(mime_type.to_string()),
            trashed: Some(false),
        }
    }
}

/// One page of a `files.list` response.
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
    #[serde(default)]
    pub files: Vec<DriveItem>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Destination of a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Slash-delimited object key, e.g. `Reports/2024/summary.docx`.
    pub key: String,
    pub content_type: String,
}

/// What the store reports back once an upload has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub key: String,
    pub content_type: String,
    pub bytes: u64,
    pub parts: usize,
}

/// Read side: the Drive v3 files API.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// Fetch one page of files matching `query`, continuing from `page_token`.
    async fn list_page(
        &self,
        query: &str,
        page_token: Option<String>,
    ) -> Result<FileListPage, SyncError>;

    /// Open a direct byte stream of a stored (non-native) file.
    async fn download(&self, file_id: &str) -> Result<ByteStream, SyncError>;

    /// Open a byte stream of a native document converted to `mime_type`.
    async fn export(&self, file_id: &str, mime_type: &str) -> Result<ByteStream, SyncError>;
}

/// Write side: a bucket accepting multi-part uploads.
///
/// Implementations must not leave uploaded parts behind when the upload fails.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        request: UploadRequest,
        body: ByteStream,
    ) -> Result<UploadReceipt, SyncError>;
}
