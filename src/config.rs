use crate::error::AppError;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_ACCOUNTS_PATH: &str = "account.json";

/// Environment overrides, e.g. `EMAIL_CODES_DATABASE__HOST`.
const ENV_PREFIX: &str = "EMAIL_CODES_";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Mysql,
    /// `name` is the path of the database file.
    Sqlite,
}

/// Connection settings for the `email_codes` table.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Driver>,
}

impl DatabaseConfig {
    pub fn driver(&self) -> Driver {
        self.driver.unwrap_or_default()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            name: "test_db".to_string(),
            port: None,
            driver: None,
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("driver", &self.driver())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseConfig,

    #[serde(default = "default_accounts_path", skip_serializing)]
    pub accounts_path: PathBuf,

    #[serde(default = "default_loglevel", skip_serializing)]
    pub loglevel: String,
}

fn default_accounts_path() -> PathBuf {
    PathBuf::from(DEFAULT_ACCOUNTS_PATH)
}

fn default_loglevel() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            accounts_path: default_accounts_path(),
            loglevel: default_loglevel(),
        }
    }
}

/// Result of `ConfigStore::load`.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// Set when the file was missing or incomplete and defaults were written.
    pub defaulted: Option<AppError>,
    /// Set when the environment overrides could not be applied; the file
    /// values are used as they are.
    pub overrides_rejected: Option<AppError>,
}

/// The on-disk config file plus environment overrides.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn figment(&self) -> Figment {
        Figment::new()
            .merge(Toml::file(&self.path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the config, writing the fixed defaults when the file's
    /// `database` section or one of its keys is missing or the file is
    /// malformed. Environment overrides never cause the file to be rewritten.
    ///
    /// Only a failure to write the default file is returned as an error.
    pub fn load(&self) -> Result<LoadedConfig, AppError> {
        let (file_config, defaulted) =
            match Figment::from(Toml::file(&self.path)).extract::<Config>() {
                Ok(config) => (config, None),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "config incomplete; writing defaults");
                    self.write_defaults()?;
                    (Config::default(), Some(AppError::Configuration(e)))
                }
            };

        match self.figment().extract::<Config>() {
            Ok(config) => Ok(LoadedConfig {
                config,
                defaulted,
                overrides_rejected: None,
            }),
            Err(e) => {
                warn!(error = %e, "environment overrides rejected; using file values");
                Ok(LoadedConfig {
                    config: file_config,
                    defaulted,
                    overrides_rejected: Some(AppError::Configuration(e)),
                })
            }
        }
    }

    fn write_defaults(&self) -> Result<(), AppError> {
        let body = toml::to_string(&Config::default())?;
        fs::write(&self.path, body)?;
        info!(path = %self.path.display(), "default config file written");
        Ok(())
    }
}
