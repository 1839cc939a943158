use super::sync::{PhaseTracker, SyncError, SyncPhase};
use crate::config::DatabaseConfig;
use crate::types::CredentialRecord;
use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use tracing::warn;

/// Upsert by unique email using `INSERT ... ON CONFLICT(email) DO UPDATE`.
const SQLITE_UPSERT: &str = r#"
INSERT INTO email_codes (email, code, sold) VALUES (?, ?, ?)
ON CONFLICT(email) DO UPDATE SET
    code = excluded.code,
    sold = excluded.sold
"#;

/// `name` is the database file; it must already exist with the table in it.
fn connect_options(cfg: &DatabaseConfig) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(&cfg.name)
        .create_if_missing(false)
}

pub(super) async fn push(
    cfg: &DatabaseConfig,
    records: &[&CredentialRecord],
    phase: &mut PhaseTracker,
) -> Result<(), SyncError> {
    phase.advance(SyncPhase::Connecting);
    let mut conn = SqliteConnection::connect_with(&connect_options(cfg))
        .await
        .map_err(|e| phase.fail(e))?;
    phase.advance(SyncPhase::Connected);

    let result = upsert_all(&mut conn, records, phase).await;

    if let Err(e) = conn.close().await {
        warn!(phase = %phase.current(), error = %e, "closing sqlite connection failed");
    }
    result
}

async fn upsert_all(
    conn: &mut SqliteConnection,
    records: &[&CredentialRecord],
    phase: &mut PhaseTracker,
) -> Result<(), SyncError> {
    let mut tx = conn.begin().await.map_err(|e| phase.fail(e))?;

    for (i, rec) in records.iter().enumerate() {
        phase.advance(SyncPhase::Upserting(i));
        let executed = sqlx::query(SQLITE_UPSERT)
            .bind(rec.email.as_str())
            .bind(rec.secret.as_str())
            .bind(rec.sold)
            .execute(&mut *tx)
            .await;
        if let Err(e) = executed {
            let err = phase.fail(e);
            if let Err(rb) = tx.rollback().await {
                warn!(error = %rb, "rollback after failed upsert did not complete");
            }
            return Err(err);
        }
    }

    tx.commit().await.map_err(|e| phase.fail(e))?;
    phase.advance(SyncPhase::Committed);
    Ok(())
}
