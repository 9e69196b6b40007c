use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use drive_bucket_core::contract::{DriveItem, FileListPage, MockDriveClient};
use drive_bucket_core::listing::{list_folder_contents, MAX_LISTING_PAGES};

/// Mock that serves `total_pages` pages of one file each, chaining tokens `p2`, `p3`, ...
fn paged_drive(total_pages: usize, calls: Arc<AtomicUsize>) -> MockDriveClient {
    let mut drive = MockDriveClient::new();
    drive.expect_list_page().returning(move |_query, token| {
        let page = calls.fetch_add(1, Ordering::SeqCst) + 1;
        let expected = if page == 1 {
            None
        } else {
            Some(format!("p{page}"))
        };
        assert_eq!(token, expected, "page {page} must continue from the previous token");

        Ok(FileListPage {
            files: vec![DriveItem::new(
                &format!("file{page}"),
                &format!("file{page}.txt"),
                "text/plain",
            )],
            next_page_token: (page < total_pages).then(|| format!("p{}", page + 1)),
        })
    });
    drive
}

#[tokio::test]
async fn test_pagination_stops_at_ceiling() {
    let calls = Arc::new(AtomicUsize::new(0));
    let drive = paged_drive(25, calls.clone());
    let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let items = list_folder_contents(&drive, "root", cutoff).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), MAX_LISTING_PAGES);
    assert_eq!(calls.load(Ordering::SeqCst), 20);
    assert_eq!(items.len(), 20);
    assert_eq!(items[19].id.as_deref(), Some("file20"));
}

#[tokio::test]
async fn test_pagination_accumulates_until_last_page() {
    let calls = Arc::new(AtomicUsize::new(0));
    let drive = paged_drive(3, calls.clone());
    let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let items = list_folder_contents(&drive, "root", cutoff).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let names: Vec<_> = items.iter().filter_map(|i| i.name.as_deref()).collect();
    assert_eq!(names, vec!["file1.txt", "file2.txt", "file3.txt"]);
}

#[tokio::test]
async fn test_empty_token_ends_pagination() {
    let mut drive = MockDriveClient::new();
    drive.expect_list_page().times(1).returning(|_, _| {
        Ok(FileListPage {
            files: vec![],
            next_page_token: Some(String::new()),
        })
    });
    let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let items = list_folder_contents(&drive, "empty", cutoff).await.unwrap();

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_listing_error_propagates() {
    let mut drive = MockDriveClient::new();
    drive.expect_list_page().times(1).returning(|_, _| {
        Err(drive_bucket_core::SyncError::Api {
            status: 403,
            message: "insufficient permissions".to_string(),
        })
    });
    let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let result = list_folder_contents(&drive, "root", cutoff).await;

    assert!(result.is_err());
}
