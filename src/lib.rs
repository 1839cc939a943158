pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod types;

pub use error::AppError;
pub use service::session::Session;
pub use types::CredentialRecord;
