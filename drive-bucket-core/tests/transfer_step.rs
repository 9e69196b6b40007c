use bytes::Bytes;
use futures::stream;

use drive_bucket_core::contract::{
    ByteStream, MockDriveClient, MockObjectStore, UploadReceipt, UploadRequest,
};
use drive_bucket_core::export_formats::SkipReason;
use drive_bucket_core::transfer::{TransferOutcome, TransferRequest, Transferrer};

fn body(data: &'static [u8]) -> ByteStream {
    Box::pin(stream::iter(vec![Ok(Bytes::from_static(data))]))
}

fn accept_upload(expected_key: &'static str, expected_type: &'static str) -> MockObjectStore {
    let mut store = MockObjectStore::new();
    store
        .expect_upload()
        .withf(move |req: &UploadRequest, _| {
            req.key == expected_key && req.content_type == expected_type
        })
        .times(1)
        .returning(|req, _| {
            Ok(UploadReceipt {
                key: req.key,
                content_type: req.content_type,
                bytes: 4,
                parts: 1,
            })
        });
    store
}

#[tokio::test]
async fn test_drawing_is_exported_as_png() {
    let mut drive = MockDriveClient::new();
    drive
        .expect_export()
        .withf(|id, mime| id == "draw1" && mime == "image/png")
        .times(1)
        .returning(|_, _| Ok(body(b"\x89PNG")));
    drive.expect_download().never();
    let store = accept_upload("Diagrams/flow", "image/png");

    let request = TransferRequest {
        file_id: "draw1".to_string(),
        file_name: "flow".to_string(),
        file_mime_type: "application/vnd.google-apps.drawing".to_string(),
        folder_path: "Diagrams".to_string(),
    };
    let outcome = Transferrer::new(&drive, &store)
        .transfer(&request)
        .await
        .unwrap();

    assert!(matches!(outcome, TransferOutcome::Uploaded(r) if r.content_type == "image/png"));
}

#[tokio::test]
async fn test_regular_file_keeps_original_type() {
    let mut drive = MockDriveClient::new();
    drive
        .expect_download()
        .withf(|id| id == "pdf1")
        .times(1)
        .returning(|_| Ok(body(b"%PDF")));
    drive.expect_export().never();
    let store = accept_upload("invoice.pdf", "application/pdf");

    let request = TransferRequest {
        file_id: "pdf1".to_string(),
        file_name: "invoice.pdf".to_string(),
        file_mime_type: "application/pdf".to_string(),
        folder_path: String::new(),
    };
    let outcome = Transferrer::new(&drive, &store)
        .transfer(&request)
        .await
        .unwrap();

    assert!(matches!(outcome, TransferOutcome::Uploaded(r) if r.key == "invoice.pdf"));
}

#[tokio::test]
async fn test_unmapped_native_type_touches_nothing() {
    let mut drive = MockDriveClient::new();
    drive.expect_export().never();
    drive.expect_download().never();
    let mut store = MockObjectStore::new();
    store.expect_upload().never();

    let request = TransferRequest {
        file_id: "site1".to_string(),
        file_name: "Intranet".to_string(),
        file_mime_type: "application/vnd.google-apps.site".to_string(),
        folder_path: "Web".to_string(),
    };
    let outcome = Transferrer::new(&drive, &store)
        .transfer(&request)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TransferOutcome::Skipped {
            reason: SkipReason::UnsupportedNativeType
        }
    );
}
