//! Database sync: pushes rows into the `email_codes` table.
//!
//! Layout:
//! - `schema.rs`: DDL for the table the sync expects to exist
//! - `sync.rs`: phases, errors and the per-call entry point
//! - `mysql.rs` / `sqlite.rs`: one-connection upsert per driver

mod mysql;
pub mod schema;
mod sqlite;
pub mod sync;

pub use schema::{MYSQL_INIT, SQLITE_INIT};
pub use sync::{SyncError, SyncPhase, SyncReport, sync};
