use crate::config::{Config, DatabaseConfig, LoadedConfig};
use crate::db::SyncReport;
use crate::error::AppError;
use crate::service::json_store::{JsonStore, LoadOutcome};
use crate::service::notice::Notice;
use crate::service::rows::RowCollection;
use crate::service::sync_worker::SyncHandle;
use crate::types::CredentialRecord;
use std::path::Path;
use tracing::{info, warn};

/// Field changes for `Session::edit_row`; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct RowEdit {
    pub email: Option<String>,
    pub secret: Option<String>,
    pub sold: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub saved: usize,
    /// `None` when the submit did not ask for a database sync.
    pub synced: Option<SyncReport>,
}

/// Everything one run of the tool works on.
pub struct Session {
    database: DatabaseConfig,
    rows: RowCollection,
    store: JsonStore,
    sync: SyncHandle,
    notices: Vec<Notice>,
}

impl Session {
    /// Load the accounts file named by the config.
    ///
    /// Recovered conditions (defaulted config, created or unreadable accounts
    /// file) become notices; the session always opens.
    pub fn open(loaded: LoadedConfig, sync: SyncHandle) -> Self {
        let LoadedConfig {
            config,
            defaulted,
            overrides_rejected,
        } = loaded;
        let Config {
            database,
            accounts_path,
            ..
        } = config;

        let mut notices = Vec::new();
        if let Some(e) = defaulted {
            notices.push(e.to_notice());
            notices.push(Notice::info(
                "Config created",
                "A default config file was generated",
            ));
        }
        if let Some(e) = overrides_rejected {
            notices.push(e.to_notice());
        }

        let store = JsonStore::new(accounts_path);
        let rows = match store.load() {
            Ok(LoadOutcome::Loaded(rows)) => rows,
            Ok(LoadOutcome::Created) => {
                notices.push(Notice::info(
                    "File created",
                    format!("Generated an empty {}", store.path().display()),
                ));
                RowCollection::new()
            }
            Err(e) => {
                warn!(path = %store.path().display(), error = %e, "accounts file unusable; starting empty");
                notices.push(e.to_notice());
                RowCollection::new()
            }
        };
        info!(rows = rows.len(), database = ?database, "session opened");

        Self {
            database,
            rows,
            store,
            sync,
            notices,
        }
    }

    pub fn rows(&self) -> &RowCollection {
        &self.rows
    }

    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    /// Replace the database settings for this session only.
    pub fn override_database(&mut self, database: DatabaseConfig) {
        info!(database = ?database, "database settings overridden for this session");
        self.database = database;
    }

    pub fn add_row(&mut self, record: CredentialRecord) {
        self.rows.append(record);
    }

    pub fn edit_row(&mut self, index: usize, edit: RowEdit) -> Result<(), AppError> {
        let row = self.rows.get_mut(index).ok_or(AppError::RowNotFound(index))?;
        if let Some(email) = edit.email {
            row.email = email;
        }
        if let Some(secret) = edit.secret {
            row.secret = secret;
        }
        if let Some(sold) = edit.sold {
            row.sold = sold;
        }
        Ok(())
    }

    /// Append every record from `path`, without deduplication.
    pub fn import(&mut self, path: &Path) -> Result<usize, AppError> {
        let records = JsonStore::read_import(path)?;
        let count = records.len();
        self.rows.extend(records);
        info!(path = %path.display(), count, "rows imported");
        Ok(count)
    }

    /// Write the accounts file, then optionally push the rows to the database.
    ///
    /// The file is written before the sync starts, so a failed sync never
    /// loses local edits.
    pub async fn submit(&mut self, sync_to_db: bool) -> Result<SubmitOutcome, AppError> {
        self.store.save(&self.rows)?;
        let saved = self.rows.len();
        if !sync_to_db {
            return Ok(SubmitOutcome {
                saved,
                synced: None,
            });
        }

        let dups = self.rows.duplicate_emails();
        if !dups.is_empty() {
            warn!(emails = ?dups, "duplicate emails collapse to one row in the database");
        }

        let report = self
            .sync
            .run(self.rows.all().to_vec(), self.database.clone())
            .await?;
        self.notices.push(Notice::info(
            "Submitted",
            "Data saved and synced to the database",
        ));
        Ok(SubmitOutcome {
            saved,
            synced: Some(report),
        })
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
