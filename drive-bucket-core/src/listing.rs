//! Folder listing with the freshness filter and bounded pagination.
//!
//! Trashed entries are never listed. Folders are always listed so the walk can
//! reach fresh files below stale folders; other entries only when they were
//! created or modified since the start of yesterday (UTC).

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::{info, warn};

use crate::contract::{DriveClient, DriveItem};
use crate::error::Result;
use crate::export_formats::FOLDER_MIME_TYPE;

/// Largest page the Drive API hands out.
pub const PAGE_SIZE: u32 = 1000;

/// Pages fetched per folder before the listing is cut off.
pub const MAX_LISTING_PAGES: usize = 20;

/// Start of the day before `now`, as a UTC timestamp.
pub fn freshness_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    let yesterday = now.date_naive() - Duration::days(1);
    yesterday.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Drive query for the children of `folder_id`.
pub fn folder_query(folder_id: &str, cutoff: DateTime<Utc>) -> String {
    let since = cutoff.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        "'{}' in parents and trashed = false and (mimeType = '{}' or (createdTime >= '{}' or modifiedTime >= '{}'))",
        escape_query_literal(folder_id),
        FOLDER_MIME_TYPE,
        since,
        since
    )
}

fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Lists the children of `folder_id`, following continuation tokens for at most
/// [`MAX_LISTING_PAGES`] pages.
pub async fn list_folder_contents<D>(
    drive: &D,
    folder_id: &str,
    cutoff: DateTime<Utc>,
) -> Result<Vec<DriveItem>>
where
    D: DriveClient + ?Sized,
{
    let query = folder_query(folder_id, cutoff);
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;

    for page in 1..=MAX_LISTING_PAGES {
        info!(
            folder_id,
            page,
            next_page_token = page_token.as_deref(),
            "Listing folder contents at page {}",
            page
        );

        let response = drive.list_page(&query, page_token.take()).await?;
        items.extend(response.files);

        match response.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(items),
        }
    }

    warn!(
        folder_id,
        max_pages = MAX_LISTING_PAGES,
        items = items.len(),
        "Listing truncated at page ceiling"
    );
    Ok(items)
}
