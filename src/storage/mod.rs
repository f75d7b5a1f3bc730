//! SQLite storage layer for folio.
//!
//! Owns the single database connection the server uses for the lifetime of
//! the process. Handles schema creation and CRUD for portfolio content,
//! contact messages, admin accounts and sessions.

mod admin;
mod content;
mod messages;
mod singletons;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use thiserror::Error;

pub use admin::{AdminUserRow, SessionRow};
pub use content::{AchievementRow, ExperienceRow, GoalRow, ProjectRow, SkillRow};
pub use messages::ContactMessageRow;
pub use singletons::{Availability, ContactInfoRow, ProfileRow};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

// ---------------------------------------------------------------------------
// Storage handle
// ---------------------------------------------------------------------------

/// Main storage handle wrapping a SQLite connection.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create a database at the given path. Creates schema if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Create an in-memory database. Used by tests and throwaway instances.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Close the connection, flushing the WAL. Called once at shutdown.
    pub fn close(self) -> Result<(), StorageError> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }

    /// Cheap round trip used by the health endpoint.
    pub fn ping(&self) -> Result<(), StorageError> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS profile (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                about           TEXT NOT NULL,
                headline        TEXT NOT NULL,
                availability    TEXT NOT NULL DEFAULT 'available',
                profile_image   TEXT,
                location        TEXT,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                tech_stack      TEXT NOT NULL DEFAULT '[]',
                repo_url        TEXT,
                live_url        TEXT,
                image           TEXT,
                featured        INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_projects_created
                ON projects(created_at);

            CREATE TABLE IF NOT EXISTS experiences (
                id              TEXT PRIMARY KEY,
                company         TEXT NOT NULL,
                role            TEXT NOT NULL,
                description     TEXT NOT NULL,
                location        TEXT,
                start_date      TEXT NOT NULL,
                end_date        TEXT,
                current         INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS skills (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                category        TEXT NOT NULL,
                proficiency     INTEGER NOT NULL,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS achievements (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                date            TEXT,
                link            TEXT,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS goals (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                target_date     TEXT,
                completed       INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS contact_messages (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                email           TEXT NOT NULL,
                subject         TEXT,
                message         TEXT NOT NULL,
                is_read         INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_contact_messages_created
                ON contact_messages(created_at);
            CREATE INDEX IF NOT EXISTS idx_contact_messages_unread
                ON contact_messages(is_read);

            CREATE TABLE IF NOT EXISTS contact_info (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL,
                phone           TEXT,
                location        TEXT,
                linkedin        TEXT,
                github          TEXT,
                twitter         TEXT,
                website         TEXT,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS admin_users (
                id              TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                token_hash      TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES admin_users(id) ON DELETE CASCADE,
                created_at      INTEGER NOT NULL,
                expires_at      INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// `SELECT COUNT(*)` over a table, optionally restricted to rows created
    /// at or after `since`. Table names come from this module only.
    fn count_rows(&self, table: &str, since: Option<DateTime<Utc>>) -> Result<u64, StorageError> {
        let count: i64 = match since {
            Some(since) => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE created_at >= ?1"),
                params![to_unix(&since)],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {table}"),
                [],
                |row| row.get(0),
            )?,
        };
        Ok(count.max(0) as u64)
    }
}

/// Resolve the database path: `{data_dir}/folio.db`.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("folio.db")
}

pub(crate) fn to_unix(at: &DateTime<Utc>) -> i64 {
    at.timestamp()
}

pub(crate) fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_storage() -> Storage {
        Storage::open_in_memory().unwrap()
    }

    #[test]
    fn test_schema_creation_is_idempotent() {
        let storage = test_storage();
        storage.create_schema().unwrap();
        storage.ping().unwrap();
    }

    #[test]
    fn test_open_on_disk_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = db_path(&dir.path().join("nested"));
        let storage = Storage::open(&path).unwrap();
        storage.ping().unwrap();
        storage.close().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unix_round_trip_truncates_to_seconds() {
        let at = from_unix(1_700_000_123);
        assert_eq!(to_unix(&at), 1_700_000_123);
        assert_eq!(from_unix(0), DateTime::<Utc>::default());
    }
}
