use super::sync::{PhaseTracker, SyncError, SyncPhase};
use crate::config::DatabaseConfig;
use crate::types::CredentialRecord;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use tracing::warn;

/// MySQL upsert; code and sold are bound twice for the update clause.
const MYSQL_UPSERT: &str = r#"
INSERT INTO email_codes (email, code, sold) VALUES (?, ?, ?)
ON DUPLICATE KEY UPDATE code = ?, sold = ?
"#;

fn connect_options(cfg: &DatabaseConfig) -> MySqlConnectOptions {
    let opts = MySqlConnectOptions::new()
        .host(&cfg.host)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.name);
    match cfg.port {
        Some(port) => opts.port(port),
        None => opts,
    }
}

pub(super) async fn push(
    cfg: &DatabaseConfig,
    records: &[&CredentialRecord],
    phase: &mut PhaseTracker,
) -> Result<(), SyncError> {
    phase.advance(SyncPhase::Connecting);
    let mut conn = MySqlConnection::connect_with(&connect_options(cfg))
        .await
        .map_err(|e| phase.fail(e))?;
    phase.advance(SyncPhase::Connected);

    let result = upsert_all(&mut conn, records, phase).await;

    if let Err(e) = conn.close().await {
        warn!(phase = %phase.current(), error = %e, "closing mysql connection failed");
    }
    result
}

async fn upsert_all(
    conn: &mut MySqlConnection,
    records: &[&CredentialRecord],
    phase: &mut PhaseTracker,
) -> Result<(), SyncError> {
    let mut tx = conn.begin().await.map_err(|e| phase.fail(e))?;

    for (i, rec) in records.iter().enumerate() {
        phase.advance(SyncPhase::Upserting(i));
        let executed = sqlx::query(MYSQL_UPSERT)
            .bind(rec.email.as_str())
            .bind(rec.secret.as_str())
            .bind(rec.sold)
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
