#![doc = "drive-bucket-core: core logic library for drive-bucket."]

//! This crate holds everything needed to mirror a Google Drive folder tree into
//! an object storage bucket: the data model, the export-format table, the
//! paginated listing, the per-file transfer and the recursive walker, plus the
//! production Drive and S3 clients behind the [`contract`] traits.
//!
//! # Usage
//! Build a [`drive::GoogleDriveClient`] and a [`storage::OpendalStore`], hand
//! them to a [`synchronise::SyncManager`] and call `run` with the root folder id.

pub mod config;
pub mod contract;
pub mod drive;
pub mod error;
pub mod export_formats;
pub mod listing;
pub mod storage;
pub mod synchronise;
pub mod transfer;

pub use error::{Result, SyncError};
