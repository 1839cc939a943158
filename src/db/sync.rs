use crate::config::{DatabaseConfig, Driver};
use crate::types::CredentialRecord;
use std::fmt;
use thiserror::Error as ThisError;
use tracing::{debug, info, warn};

/// Where a single sync call is in its lifecycle.
///
/// `Idle -> Connecting -> Connected -> Upserting(i) -> Committed -> Closed`,
/// with `Failed -> Closed` reachable from Connecting through Upserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Connecting,
    Connected,
    Upserting(usize),
    Committed,
    Failed,
    Closed,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Idle => f.write_str("idle"),
            SyncPhase::Connecting => f.write_str("connecting"),
            SyncPhase::Connected => f.write_str("connected"),
            SyncPhase::Upserting(i) => write!(f, "upserting record {i}"),
            SyncPhase::Committed => f.write_str("committed"),
            SyncPhase::Failed => f.write_str("failed"),
            SyncPhase::Closed => f.write_str("closed"),
        }
    }
}

/// Connection, authentication and statement failures all land here.
#[derive(Debug, ThisError)]
#[error("sync failed while {phase}: {source}")]
pub struct SyncError {
    /// Last phase reached before the failure.
    pub phase: SyncPhase,
    #[source]
    pub source: sqlx::Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub upserted: usize,
    /// Rows with a blank email, which have no key to upsert on.
    pub skipped: usize,
}

/// Tracks phase transitions for one sync call.
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    current: SyncPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            current: SyncPhase::Idle,
        }
    }

    pub(crate) fn current(&self) -> SyncPhase {
        self.current
    }

    pub(crate) fn advance(&mut self, next: SyncPhase) {
        debug!(from = %self.current, to = %next, "sync phase");
        self.current = next;
    }

    pub(crate) fn fail(&mut self, source: sqlx::Error) -> SyncError {
        let err = SyncError {
            phase: self.current,
            source,
        };
        self.advance(SyncPhase::Failed);
        err
    }
}

/// Push every keyed record to the table over one fresh connection and one
/// transaction. The connection is closed whatever the outcome.
pub async fn sync(records: &[CredentialRecord], cfg: &DatabaseConfig) -> Result<SyncReport, SyncError> {
    let keyed: Vec<&CredentialRecord> = records.iter().filter(|r| r.has_key()).collect();
    let skipped = records.len() - keyed.len();
    if skipped > 0 {
        warn!(skipped, "rows without an email are not synced");
    }

    let mut phase = PhaseTracker::new();
    let result = match cfg.driver() {
        Driver::Mysql => super::mysql::push(cfg, &keyed, &mut phase).await,
        Driver::Sqlite => super::sqlite::push(cfg, &keyed, &mut phase).await,
    };
    phase.advance(SyncPhase::Closed);

    match &result {
        Ok(()) => info!(
            host = %cfg.host,
            database = %cfg.name,
            upserted = keyed.len(),
            "database sync committed"
        ),
        Err(e) => warn!(host = %cfg.host, database = %cfg.name, error = %e, "database sync failed"),
    }
    result.map(|()| SyncReport {
        upserted: keyed.len(),
        skipped,
    })
}
