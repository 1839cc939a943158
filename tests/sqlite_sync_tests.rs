mod common;

use common::{create_default_table, create_table, sqlite_config, table_rows, temp_dir};
use email_codes::CredentialRecord;
use email_codes::db::{self, SyncPhase};
use std::fs;

#[tokio::test]
async fn syncing_twice_keeps_one_row_with_latest_values() {
    let dir = temp_dir("sync-twice");
    let db_path = dir.join("codes.sqlite");
    create_default_table(&db_path).await;
    let cfg = sqlite_config(&db_path);

    let mut records = vec![CredentialRecord::new("a@x.com", "p1", false)];
    db::sync(&records, &cfg).await.expect("first sync failed");

    records[0].secret = "p2".to_string();
    let report = db::sync(&records, &cfg).await.expect("second sync failed");
    assert_eq!(report.upserted, 1);

    assert_eq!(
        table_rows(&db_path).await,
        vec![("a@x.com".to_string(), "p2".to_string(), false)]
    );
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn duplicates_in_one_batch_collapse_to_the_last() {
    let dir = temp_dir("sync-dups");
    let db_path = dir.join("codes.sqlite");
    create_default_table(&db_path).await;

    let records = vec![
        CredentialRecord::new("a@x.com", "p1", false),
        CredentialRecord::new("b@x.com", "q1", true),
        CredentialRecord::new("a@x.com", "p2", true),
        CredentialRecord::new("", "orphan", false),
    ];
    let report = db::sync(&records, &sqlite_config(&db_path)).await.unwrap();
    assert_eq!(report.upserted, 3);
    assert_eq!(report.skipped, 1);

    assert_eq!(
        table_rows(&db_path).await,
        vec![
            ("a@x.com".to_string(), "p2".to_string(), true),
            ("b@x.com".to_string(), "q1".to_string(), true),
        ]
    );
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn failure_mid_batch_commits_nothing() {
    let dir = temp_dir("sync-rollback");
    let db_path = dir.join("codes.sqlite");
    create_table(
        &db_path,
        "CREATE TABLE email_codes (
            email TEXT NOT NULL PRIMARY KEY,
            code TEXT NOT NULL CHECK (code <> ''),
            sold INTEGER NOT NULL
        )",
    )
    .await;

    let records = vec![
        CredentialRecord::new("a@x.com", "p1", false),
        CredentialRecord::new("b@x.com", "", false),
    ];
    let err = db::sync(&records, &sqlite_config(&db_path)).await.unwrap_err();
    assert_eq!(err.phase, SyncPhase::Upserting(1));
    assert!(table_rows(&db_path).await.is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_table_is_not_created() {
    let dir = temp_dir("sync-no-table");
    let db_path = dir.join("codes.sqlite");
    create_table(&db_path, "CREATE TABLE unrelated (id INTEGER)").await;

    let records = vec![CredentialRecord::new("a@x.com", "p1", false)];
    let err = db::sync(&records, &sqlite_config(&db_path)).await.unwrap_err();
    assert_eq!(err.phase, SyncPhase::Upserting(0));
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn unreachable_database_fails_while_connecting() {
    let dir = temp_dir("sync-unreachable");
    let cfg = sqlite_config(&dir.join("absent.sqlite"));

    let err = db::sync(&[], &cfg).await.unwrap_err();
    assert_eq!(err.phase, SyncPhase::Connecting);
    assert!(!dir.join("absent.sqlite").exists());
    let _ = fs::remove_dir_all(&dir);
}
