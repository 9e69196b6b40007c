//! Google Drive API v3 client.
//!
//! Implements [`DriveClient`] over plain HTTPS with `reqwest`. Requests are
//! authorised with a bearer token from a [`TokenSource`]; in production that is
//! a service-account authenticator limited to the read-only Drive scope.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::{debug, info, instrument};
use yup_oauth2::authenticator::DefaultAuthenticator;

use crate::config::ServiceAccountCredentials;
use crate::contract::{ByteStream, DriveClient, FileListPage};
use crate::error::{Result, SyncError};
use crate::listing::PAGE_SIZE;

/// Google Drive API base URL
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Fields requested for every listing page
const LIST_FIELDS: &str = "files(id,name,mimeType,trashed),nextPageToken";

/// Source of OAuth 2.0 access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, for short-lived tools and tests.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Tokens minted for a Google service account.
///
/// The authenticator caches tokens and refreshes them when they expire.
pub struct ServiceAccountTokenSource {
    authenticator: DefaultAuthenticator,
}

impl ServiceAccountTokenSource {
    pub async fn new(credentials: &ServiceAccountCredentials) -> Result<Self> {
        let key = serde_json::json!({
            "type": "service_account",
            "project_id": credentials.project_id,
            "private_key_id": credentials.private_key_id,
            "private_key": credentials.private_key,
            "client_email": credentials.client_email,
            "client_id": credentials.client_id,
            "token_uri": TOKEN_URI,
        });
        let key = yup_oauth2::parse_service_account_key(key.to_string())
            .map_err(|e| SyncError::Auth(format!("Invalid service account key: {e}")))?;

        let authenticator = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| SyncError::Auth(format!("Failed to build authenticator: {e}")))?;

        info!(client_email = %credentials.client_email, "Service account authenticator ready");
        Ok(Self { authenticator })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String> {
        let token = self
            .authenticator
            .token(&[DRIVE_READONLY_SCOPE])
            .await
            .map_err(|e| SyncError::Auth(e.to_string()))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| SyncError::Auth("Token response carried no access token".to_string()))
    }
}

/// Drive v3 connector.
pub struct GoogleDriveClient {
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    base_url: String,
}

impl GoogleDriveClient {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_base_url(tokens, DRIVE_API_BASE)
    }

    /// Points the client at another API root, e.g. a local emulator.
    pub fn with_base_url(tokens: Arc<dyn TokenSource>, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn list_url(&self, query: &str, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/files?q={}&fields={}&pageSize={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(LIST_FIELDS),
            PAGE_SIZE
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        url
    }

    fn media_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}?alt=media",
            self.base_url,
            urlencoding::encode(file_id)
        )
    }

    fn export_url(&self, file_id: &str, mime_type: &str) -> String {
        format!(
            "{}/files/{}/export?mimeType={}",
            self.base_url,
            urlencoding::encode(file_id),
            urlencoding::encode(mime_type)
        )
    }

    /// Authorised GET; non-success statuses become [`SyncError::Api`].
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let token = self.tokens.access_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "API request succeeded");
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(SyncError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn into_stream(response: reqwest::Response) -> ByteStream {
        Box::pin(
            response
                .bytes_stream()
                .map_err(|e| SyncError::Stream(e.to_string())),
        )
    }
}

#[async_trait]
impl DriveClient for GoogleDriveClient {
    #[instrument(skip(self, query))]
    async fn list_page(&self, query: &str, page_token: Option<String>) -> Result<FileListPage> {
        let url = self.list_url(query, page_token.as_deref());
        let body = self.get(&url).await?.bytes().await?;

        serde_json::from_slice(&body)
            .map_err(|e| SyncError::Parse(format!("Failed to parse files list response: {e}")))
    }

    #[instrument(skip(self))]
    async fn download(&self, file_id: &str) -> Result<ByteStream> {
        let response = self.get(&self.media_url(file_id)).await?;
        Ok(Self::into_stream(response))
    }

    #[instrument(skip(self))]
    async fn export(&self, file_id: &str, mime_type: &str) -> Result<ByteStream> {
        let response = self.get(&self.export_url(file_id, mime_type)).await?;
        Ok(Self::into_stream(response))
    }
}
