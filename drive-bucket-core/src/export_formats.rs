//! Mapping of Drive-native document types to interoperable export formats.
//!
//! Native documents (Docs, Sheets, Slides, ...) have no downloadable bytes of
//! their own and must be exported. Everything else is downloaded as stored.

/// Prefix shared by every Drive-native mime type.
pub const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps";

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Native type to export type.
pub const EXPORT_FORMATS: [(&str, &str); 6] = [
    (
        "application/vnd.google-apps.document",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "application/vnd.google-apps.spreadsheet",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "application/vnd.google-apps.presentation",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("application/vnd.google-apps.drawing", "image/png"),
    (
        "application/vnd.google-apps.script",
        "application/vnd.google-apps.script+json",
    ),
    ("application/vnd.google-apps.jam", "application/pdf"),
];

pub fn is_folder(mime_type: &str) -> bool {
    mime_type == FOLDER_MIME_TYPE
}

pub fn is_native(mime_type: &str) -> bool {
    mime_type.starts_with(NATIVE_MIME_PREFIX)
}

/// Export type for a native document, if one is known.
pub fn export_mime_type(mime_type: &str) -> Option<&'static str> {
    EXPORT_FORMATS
        .iter()
        .find(|(native, _)| *native == mime_type)
        .map(|(_, export)| *export)
}

/// How a single file gets from Drive to the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPlan {
    /// Native document converted on the way out; stored with the export type.
    Export { export_mime_type: &'static str },
    /// Stored file copied as-is; stored with its own type.
    DirectDownload { content_type: String },
    /// Nothing is read or written.
    Skipped { reason: SkipReason },
}

/// Why an item was left out of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Listing entry without id, name or mime type
    MalformedEntry,
    /// Folder deeper than the configured nesting limit
    NestingLimit,
    /// Native document type with no export format
    UnsupportedNativeType,
}

pub fn plan_transfer(mime_type: &str) -> TransferPlan {
    if !is_native(mime_type) {
        return TransferPlan::DirectDownload {
            content_type: mime_type.to_string(),
        };
    }

    match export_mime_type(mime_type) {
        Some(export_mime_type) => TransferPlan::Export { export_mime_type },
        None => {
            tracing::warn!(mime_type, "No export format found for mimeType");
            TransferPlan::Skipped {
                reason: SkipReason::UnsupportedNativeType,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_entry_exports() {
        for (native, export) in EXPORT_FORMATS {
            assert_eq!(
                plan_transfer(native),
                TransferPlan::Export {
                    export_mime_type: export
                }
            );
        }
    }

    #[test]
    fn test_document_exports_to_docx() {
        assert_eq!(
            export_mime_type("application/vnd.google-apps.document"),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        );
    }

    #[test]
    fn test_unmapped_native_type_is_skipped() {
        assert_eq!(
            plan_transfer("application/vnd.google-apps.form"),
            TransferPlan::Skipped {
                reason: SkipReason::UnsupportedNativeType
            }
        );
    }

    #[test]
    fn test_regular_file_keeps_its_type() {
        assert_eq!(
            plan_transfer("application/pdf"),
            TransferPlan::DirectDownload {
                content_type: "application/pdf".to_string()
            }
        );
    }

    #[test]
    fn test_folder_detection() {
        assert!(is_folder(FOLDER_MIME_TYPE));
        assert!(is_native(FOLDER_MIME_TYPE));
        assert!(!is_folder("application/vnd.google-apps.document"));
    }
}
