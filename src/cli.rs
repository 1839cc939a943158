use crate::config::{DEFAULT_CONFIG_PATH, DatabaseConfig};
use crate::service::session::RowEdit;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Manage email/code rows in account.json and push them to the database
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "email-codes", version)]
#[command(about = "Manage email/code rows and sync them to the email_codes table", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long = "config", default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config_path: PathBuf,

    /// Also push every row to the database after saving
    #[arg(long, global = true)]
    pub sync: bool,

    #[command(flatten)]
    pub database: DatabaseOverride,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every row
    List,

    /// Append a row and save
    Add {
        email: String,

        #[arg(allow_hyphen_values = true)]
        code: String,

        /// Mark the row as sold
        #[arg(long)]
        sold: bool,
    },

    /// Edit a row in place and save
    Set {
        index: usize,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        code: Option<String>,

        /// `--sold` alone means `--sold true`
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        sold: Option<bool>,
    },

    /// Append rows from a JSON file and save
    Import { path: PathBuf },

    /// Rewrite the accounts file
    Submit,
}

/// In-memory replacements for the configured database settings.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseOverride {
    /// Database host for this run only
    #[arg(long = "db-host", global = true)]
    pub host: Option<String>,

    /// Database user for this run only
    #[arg(long = "db-user", global = true)]
    pub user: Option<String>,

    /// Database password for this run only
    #[arg(long = "db-password", global = true)]
    pub password: Option<String>,

    /// Database name for this run only
    #[arg(long = "db-name", global = true)]
    pub name: Option<String>,
}

impl DatabaseOverride {
    /// `None` when no field was overridden.
    pub fn apply(&self, base: &DatabaseConfig) -> Option<DatabaseConfig> {
        if *self == Self::default() {
            return None;
        }
        let mut cfg = base.clone();
        if let Some(host) = &self.host {
            cfg.host = host.clone();
        }
        if let Some(user) = &self.user {
            cfg.user = user.clone();
        }
        if let Some(password) = &self.password {
            cfg.password = password.clone();
        }
        if let Some(name) = &self.name {
            cfg.name = name.clone();
        }
        Some(cfg)
    }
}

impl Command {
    pub fn into_edit(self) -> Option<(usize, RowEdit)> {
        match self {
            Command::Set {
                index,
                email,
                code,
                sold,
            } => Some((
                index,
                RowEdit {
                    email,
                    secret: code,
                    sold,
                },
            )),
            _ => None,
        }
    }
}
