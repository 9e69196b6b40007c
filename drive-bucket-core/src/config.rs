//! Runtime settings, read from the process environment.
//!
//! Every setting is validated up front so that a misconfigured deployment
//! fails before the first remote call. Secrets are kept out of `Debug` output
//! and out of the log records emitted by [`SyncSettings::trace_loaded`].

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_NESTING_LEVEL_LIMIT: usize = 50;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Invalid or incomplete configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {key}")]
    Missing { key: String },

    #[error("Setting {key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: String, value: String },
}

/// Service account used to authorise Drive calls.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountCredentials {
    pub project_id: String,
    pub private_key_id: String,
    /// PEM key; literal `\n` sequences have already been turned into newlines.
    pub private_key: String,
    pub client_email: String,
    pub client_id: String,
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("project_id", &self.project_id)
            .field("private_key_id", &"<redacted>")
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Where the mirrored objects are written.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Custom endpoint for S3-compatible providers; AWS when absent.
    pub endpoint: Option<String>,
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Everything a sync run needs.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub drive_api_key: String,
    pub root_folder_id: String,
    pub service_account: ServiceAccountCredentials,
    pub storage: StorageSettings,
    pub nesting_level_limit: usize,
    pub log_level: String,
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("drive_api_key", &"<redacted>")
            .field("root_folder_id", &self.root_folder_id)
            .field("service_account", &self.service_account)
            .field("storage", &self.storage)
            .field("nesting_level_limit", &self.nesting_level_limit)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl SyncSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns the raw value for a key.
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| ConfigError::Missing {
                key: key.to_string(),
            })
        };

        let nesting_level_limit = match get("SYNC_NESTING_LEVEL_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "SYNC_NESTING_LEVEL_LIMIT".to_string(),
                    value: raw.clone(),
                })?,
            None => DEFAULT_NESTING_LEVEL_LIMIT,
        };

        Ok(SyncSettings {
            drive_api_key: required("DRIVE_API_KEY")?,
            root_folder_id: required("DRIVE_ROOT_FOLDER_ID")?,
            service_account: ServiceAccountCredentials {
                project_id: required("DRIVE_SERVICE_ACCOUNT_PROJECT_ID")?,
                private_key_id: required("DRIVE_SERVICE_ACCOUNT_PRIVATE_KEY_ID")?,
                private_key: required("DRIVE_SERVICE_ACCOUNT_PRIVATE_KEY")?.replace("\\n", "\n"),
                client_email: required("DRIVE_SERVICE_ACCOUNT_CLIENT_EMAIL")?,
                client_id: required("DRIVE_SERVICE_ACCOUNT_CLIENT_ID")?,
            },
            storage: StorageSettings {
                bucket: required("STORAGE_BUCKET_NAME")?,
                region: required("STORAGE_REGION")?,
                access_key_id: required("STORAGE_ACCESS_KEY_ID")?,
                secret_access_key: required("STORAGE_SECRET_ACCESS_KEY")?,
                endpoint: get("STORAGE_ENDPOINT"),
            },
            nesting_level_limit,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    pub fn trace_loaded(&self) {
        info!(
            root_folder_id = %self.root_folder_id,
            bucket = %self.storage.bucket,
            region = %self.storage.region,
            endpoint = self.storage.endpoint.as_deref().unwrap_or("aws"),
            client_email = %self.service_account.client_email,
            nesting_level_limit = self.nesting_level_limit,
            log_level = %self.log_level,
            "Loaded sync settings"
        );
        debug!(?self, "Sync settings loaded (full debug)");
    }
}
