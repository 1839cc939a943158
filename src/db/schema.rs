//! DDL for the `email_codes` table.
//!
//! Sync never runs these; the table has to exist before the first push.

/// MySQL schema: `email` is the primary key the upsert collides on.
pub const MYSQL_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS email_codes (
    email VARCHAR(255) NOT NULL PRIMARY KEY,
    code VARCHAR(255) NOT NULL,
    sold BOOLEAN NOT NULL DEFAULT FALSE
)
"#;

/// SQLite schema, `sold` stored as INTEGER 0/1.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS email_codes (
    email TEXT NOT NULL PRIMARY KEY,
    code TEXT NOT NULL,
    sold INTEGER NOT NULL DEFAULT 0
)
"#;
