use serial_test::serial;
use std::env;

use drive_bucket_core::config::{ConfigError, SyncSettings};

const REQUIRED: [(&str, &str); 11] = [
    ("DRIVE_API_KEY", "api-key"),
    ("DRIVE_ROOT_FOLDER_ID", "root-id"),
    ("STORAGE_BUCKET_NAME", "mirror"),
    ("STORAGE_ACCESS_KEY_ID", "AKIA"),
    ("STORAGE_SECRET_ACCESS_KEY", "secret"),
    ("STORAGE_REGION", "eu-west-1"),
    ("DRIVE_SERVICE_ACCOUNT_PROJECT_ID", "project"),
    ("DRIVE_SERVICE_ACCOUNT_PRIVATE_KEY_ID", "key-id"),
    ("DRIVE_SERVICE_ACCOUNT_PRIVATE_KEY", "line1\\nline2"),
    ("DRIVE_SERVICE_ACCOUNT_CLIENT_EMAIL", "sync@project.iam.gserviceaccount.com"),
    ("DRIVE_SERVICE_ACCOUNT_CLIENT_ID", "1234"),
];

fn set_required() {
    for (key, value) in REQUIRED {
        env::set_var(key, value);
    }
    env::remove_var("SYNC_NESTING_LEVEL_LIMIT");
    env::remove_var("LOG_LEVEL");
    env::remove_var("STORAGE_ENDPOINT");
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    set_required();
    env::set_var("SYNC_NESTING_LEVEL_LIMIT", "7");

    let settings = SyncSettings::from_env().expect("settings should load");

    assert_eq!(settings.root_folder_id, "root-id");
    assert_eq!(settings.storage.bucket, "mirror");
    assert_eq!(settings.storage.region, "eu-west-1");
    assert_eq!(settings.service_account.private_key, "line1\nline2");
    assert_eq!(settings.nesting_level_limit, 7);
    assert_eq!(settings.log_level, "info");
}

#[test]
#[serial]
fn test_from_env_missing_secret() {
    set_required();
    env::remove_var("STORAGE_SECRET_ACCESS_KEY");

    assert_eq!(
        SyncSettings::from_env(),
        Err(ConfigError::Missing {
            key: "STORAGE_SECRET_ACCESS_KEY".to_string()
        })
    );
}
