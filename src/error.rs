use crate::db::SyncError;
use crate::service::notice::Notice;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] figment::Error),

    #[error("Failed to write default config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File format error in {}: {source}", path.display())]
    FileFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] SyncError),

    #[error("A database sync is already running")]
    SyncInProgress,

    #[error("Sync worker error: {0}")]
    Worker(String),

    #[error("No row at index {0}")]
    RowNotFound(usize),
}

impl AppError {
    /// Build the file-format variant, keeping missing files distinct.
    pub(crate) fn file_format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        AppError::FileFormat {
            path: path.into(),
            source,
        }
    }

    /// Turn the error into the notice a user would see.
    pub fn to_notice(&self) -> Notice {
        match self {
            AppError::Configuration(_) | AppError::ConfigWrite(_) => {
                Notice::error("Configuration error", self.to_string())
            }
            AppError::FileNotFound(_) => Notice::error("File error", "File not found"),
            AppError::FileFormat { path, .. } => Notice::error(
                "File error",
                format!("{} has an invalid format", path.display()),
            ),
            AppError::Database(e) => Notice::error(
                "Database error",
                format!("Failed to sync to the database: {e}"),
            ),
            AppError::SyncInProgress => Notice::error(
                "Database busy",
                "A sync is still running; wait for it to finish.",
            ),
            AppError::RowNotFound(_) => {
                Notice::error("Invalid input", self.to_string())
            }
            AppError::Io(_) | AppError::Json(_) | AppError::Worker(_) => {
                Notice::error("Internal error", self.to_string())
            }
        }
    }
}
