//! S3-compatible object store backed by OpenDAL.
//!
//! Content arrives as a [`ByteStream`] and is re-cut into fixed-size parts
//! before it is handed to the OpenDAL writer, which uploads them as a
//! multi-part upload with a bounded number of parts in flight. A failure at any
//! point aborts the writer so no uploaded parts are left behind.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use opendal::{services::S3, Operator, Writer};
use tracing::{error, info};

use async_trait::async_trait;

use crate::config::StorageSettings;
use crate::contract::{ByteStream, ObjectStore, UploadReceipt, UploadRequest};
use crate::error::Result;

/// Size of each uploaded part: 5 MiB, the S3 minimum for all but the last part.
pub const PART_SIZE: usize = 5 * 1024 * 1024;

/// Parts of a single file uploaded at the same time.
pub const UPLOAD_CONCURRENCY: usize = 4;

/// Progress of one upload, emitted after each part is handed to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub key: String,
    pub part: usize,
    pub loaded: u64,
}

/// Re-chunks an arbitrary byte stream into parts of exactly `part_size` bytes.
///
/// Only the final part, returned by [`finish`](Self::finish), may be shorter.
#[derive(Debug)]
pub struct PartBuffer {
    part_size: usize,
    buf: BytesMut,
}

impl PartBuffer {
    pub fn new(part_size: usize) -> Self {
        assert!(part_size > 0, "part size must be positive");
        Self {
            part_size,
            buf: BytesMut::with_capacity(part_size),
        }
    }

    /// Appends `chunk` and returns every part that is now full.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.buf.extend_from_slice(chunk);

        let mut parts = Vec::new();
        while self.buf.len() >= self.part_size {
            parts.push(self.buf.split_to(self.part_size).freeze());
        }
        parts
    }

    /// The trailing short part, if any bytes remain.
    pub fn finish(self) -> Option<Bytes> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.buf.freeze())
        }
    }
}

/// Bucket writer over any OpenDAL service.
pub struct OpendalStore {
    operator: Operator,
    part_size: usize,
    concurrency: usize,
}

impl OpendalStore {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            part_size: PART_SIZE,
            concurrency: UPLOAD_CONCURRENCY,
        }
    }

    /// Store for an S3 bucket, or an S3-compatible one when an endpoint is set.
    pub fn s3(settings: &StorageSettings) -> Result<Self> {
        let mut builder = S3::default()
            .bucket(&settings.bucket)
            .region(&settings.region)
            .access_key_id(&settings.access_key_id)
            .secret_access_key(&settings.secret_access_key);

        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint(endpoint);
        }

        let operator = Operator::new(builder)?.finish();
        info!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = settings.endpoint.as_deref().unwrap_or("aws"),
            "Object store ready"
        );
        Ok(Self::new(operator))
    }

    /// Overrides the part size. Zero keeps the current size.
    pub fn with_part_size(mut self, part_size: usize) -> Self {
        if part_size > 0 {
            self.part_size = part_size;
        }
        self
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    async fn open_writer(&self, request: &UploadRequest) -> Result<Writer> {
        let capability = self.operator.info().full_capability();
        let mut writer = self.operator.writer_with(&request.key);

        if capability.write_can_multi {
            writer = writer.chunk(self.part_size).concurrent(self.concurrency);
        }
        if capability.write_with_content_type {
            writer = writer.content_type(&request.content_type);
        }

        Ok(writer.await?)
    }

    /// Pumps `body` into `writer` part by part; returns bytes and parts written.
    async fn pump(
        &self,
        key: &str,
        writer: &mut Writer,
        mut body: ByteStream,
    ) -> Result<(u64, usize)> {
        let mut parts = PartBuffer::new(self.part_size);
        let mut progress = UploadProgress {
            key: key.to_string(),
            part: 0,
            loaded: 0,
        };

        while let Some(chunk) = body.next().await {
            for part in parts.push(&chunk?) {
                self.write_part(writer, part, &mut progress).await?;
            }
        }
        if let Some(part) = parts.finish() {
            self.write_part(writer, part, &mut progress).await?;
        }

        Ok((progress.loaded, progress.part))
    }

    async fn write_part(
        &self,
        writer: &mut Writer,
        part: Bytes,
        progress: &mut UploadProgress,
    ) -> Result<()> {
        let len = part.len() as u64;
        writer.write(part).await?;

        progress.part += 1;
        progress.loaded += len;
        info!(progress = ?progress, "Uploading file to bucket");
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for OpendalStore {
    async fn upload(&self, request: UploadRequest, body: ByteStream) -> Result<UploadReceipt> {
        let mut writer = self.open_writer(&request).await?;

        let written = match self.pump(&request.key, &mut writer, body).await {
            Ok(written) => written,
            Err(e) => {
                error!(key = %request.key, error = %e, "Upload failed, aborting");
                if let Err(abort) = writer.abort().await {
                    error!(key = %request.key, error = %abort, "Failed to abort upload");
                }
                return Err(e);
            }
        };

        if let Err(e) = writer.close().await {
            error!(key = %request.key, error = %e, "Failed to complete upload, aborting");
            if let Err(abort) = writer.abort().await {
                error!(key = %request.key, error = %abort, "Failed to abort upload");
            }
            return Err(e.into());
        }

        let (bytes, parts) = written;
        Ok(UploadReceipt {
            key: request.key,
            content_type: request.content_type,
            bytes,
            parts,
        })
    }
}
