use crate::config::DatabaseConfig;
use crate::db::{self, SyncError, SyncReport};
use crate::error::AppError;
use crate::types::CredentialRecord;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

pub type SyncReply = oneshot::Receiver<Result<SyncReport, AppError>>;

#[derive(Debug)]
pub struct SyncJob {
    pub records: Vec<CredentialRecord>,
    pub config: DatabaseConfig,
    pub respond_to: oneshot::Sender<Result<SyncReport, AppError>>,
}

/// Handle to the background sync task. At most one job is in flight.
#[derive(Clone)]
pub struct SyncHandle {
    job_tx: mpsc::Sender<SyncJob>,
    busy: Arc<AtomicBool>,
}

impl SyncHandle {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn() -> Self {
        Self::spawn_with(|records, config| async move { db::sync(&records, &config).await })
    }

    /// Spawn a worker that runs `sync_fn` for every job.
    ///
    /// Each job runs in its own task, so a panic inside `sync_fn` is reported
    /// as `AppError::Worker` and the busy flag is still released.
    pub(crate) fn spawn_with<F, Fut>(sync_fn: F) -> Self
    where
        F: Fn(Vec<CredentialRecord>, DatabaseConfig) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<SyncReport, SyncError>> + Send + 'static,
    {
        let (job_tx, mut job_rx) = mpsc::channel::<SyncJob>(1);
        let busy = Arc::new(AtomicBool::new(false));
        let worker_busy = busy.clone();

        tokio::spawn(async move {
            info!("Sync worker started");
            while let Some(SyncJob {
                records,
                config,
                respond_to,
            }) = job_rx.recv().await
            {
                debug!(count = records.len(), "sync job received");
                let result = match tokio::spawn(sync_fn(records, config)).await {
                    Ok(outcome) => outcome.map_err(AppError::from),
                    Err(e) => {
                        error!(error = %e, "sync task aborted");
                        Err(AppError::Worker(format!("sync task failed: {e}")))
                    }
                };
                // Clear before replying so the caller can start the next sync right away.
                worker_busy.store(false, Ordering::Release);
                if respond_to.send(result).is_err() {
                    warn!("sync requester went away before the result arrived");
                }
            }
            info!("Sync worker stopped");
        });

        Self { job_tx, busy }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Hand a snapshot of the rows to the worker.
    ///
    /// Rejected with `SyncInProgress` while a previous job is outstanding.
    pub fn enqueue(
        &self,
        records: Vec<CredentialRecord>,
        config: DatabaseConfig,
    ) -> Result<SyncReply, AppError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(AppError::SyncInProgress);
        }
        let (tx_done, rx_done) = oneshot::channel();
        let job = SyncJob {
            records,
            config,
            respond_to: tx_done,
        };
        if let Err(e) = self.job_tx.try_send(job) {
            self.busy.store(false, Ordering::Release);
            return Err(AppError::Worker(format!("send sync job failed: {e}")));
        }
        Ok(rx_done)
    }

    /// Enqueue and wait for the outcome.
    pub async fn run(
        &self,
        records: Vec<CredentialRecord>,
        config: DatabaseConfig,
    ) -> Result<SyncReport, AppError> {
        let reply = self.enqueue(records, config)?;
        reply
            .await
            .map_err(|e| AppError::Worker(format!("sync worker dropped the job: {e}")))?
    }
}
