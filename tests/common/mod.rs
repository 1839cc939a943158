#![allow(dead_code)]

use email_codes::config::{DatabaseConfig, Driver};
use email_codes::db::SQLITE_INIT;
use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEQ: AtomicUsize = AtomicUsize::new(0);

/// A fresh directory under the system temp dir.
pub fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "email-codes-{label}-{}-{nanos}-{}",
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

pub fn sqlite_config(path: &Path) -> DatabaseConfig {
    DatabaseConfig {
        name: path.display().to_string(),
        driver: Some(Driver::Sqlite),
        ..DatabaseConfig::default()
    }
}

async fn open(path: &Path) -> SqliteConnection {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqliteConnection::connect_with(&opts)
        .await
        .expect("failed to open sqlite file")
}

/// Create the database file with the given DDL.
pub async fn create_table(path: &Path, ddl: &str) {
    let mut conn = open(path).await;
    sqlx::query(ddl)
        .execute(&mut conn)
        .await
        .expect("failed to create table");
    conn.close().await.expect("failed to close connection");
}

pub async fn create_default_table(path: &Path) {
    create_table(path, SQLITE_INIT).await;
}

pub async fn table_rows(path: &Path) -> Vec<(String, String, bool)> {
    let mut conn = open(path).await;
    let rows = sqlx::query_as::<_, (String, String, bool)>(
        "SELECT email, code, sold FROM email_codes ORDER BY email",
    )
    .fetch_all(&mut conn)
    .await
    .expect("failed to read table");
    conn.close().await.expect("failed to close connection");
    rows
}
