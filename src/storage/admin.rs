//! Admin accounts and login sessions.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{from_unix, to_unix, Storage, StorageError};

/// Admin account. Never serialized. `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A login session. Only the SHA-256 digest of the bearer token is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

const ADMIN_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";

fn admin_from_row(row: &Row<'_>) -> rusqlite::Result<AdminUserRow> {
    Ok(AdminUserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: from_unix(row.get(3)?),
        updated_at: from_unix(row.get(4)?),
    })
}

impl Storage {
    pub fn insert_admin_user(&self, row: &AdminUserRow) -> Result<(), StorageError> {
        self.conn.execute(
            &format!("INSERT INTO admin_users ({ADMIN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            params![
                row.id,
                row.username,
                row.password_hash,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUserRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ADMIN_COLUMNS} FROM admin_users WHERE username = ?1"))?;
        Ok(stmt.query_row(params![username], admin_from_row).optional()?)
    }

    pub fn get_admin_by_id(&self, id: &str) -> Result<Option<AdminUserRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ADMIN_COLUMNS} FROM admin_users WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], admin_from_row).optional()?)
    }

    pub fn count_admin_users(&self) -> Result<u64, StorageError> {
        self.count_rows("admin_users", None)
    }

    pub fn update_admin_credentials(&self, row: &AdminUserRow) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE admin_users SET username = ?1, password_hash = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                row.username,
                row.password_hash,
                to_unix(&row.updated_at),
                row.id,
            ],
        )?;
        Ok(affected > 0)
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    pub fn insert_session(&self, row: &SessionRow) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                row.token_hash,
                row.user_id,
                to_unix(&row.created_at),
                to_unix(&row.expires_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_session(&self, token_hash: &str) -> Result<Option<SessionRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = ?1",
        )?;
        let row = stmt
            .query_row(params![token_hash], |row| {
                Ok(SessionRow {
                    token_hash: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: from_unix(row.get(2)?),
                    expires_at: from_unix(row.get(3)?),
                })
            })
            .optional()?;
        Ok(row)
    }

    pub fn delete_session(&self, token_hash: &str) -> Result<bool, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
        Ok(affected > 0)
    }

    /// Drop every session of a user except `keep`. Used after a credential
    /// change so other logged-in browsers must sign in again.
    pub fn delete_other_sessions(&self, user_id: &str, keep: &str) -> Result<u32, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM sessions WHERE user_id = ?1 AND token_hash != ?2",
            params![user_id, keep],
        )?;
        Ok(affected as u32)
    }

    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u32, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![to_unix(&now)],
        )?;
        Ok(affected as u32)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::storage::tests::test_storage;

    fn admin(now: DateTime<Utc>) -> AdminUserRow {
        AdminUserRow {
            id: "u-1".to_string(),
            username: "admin".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_admin_crud() {
        let storage = test_storage();
        let now = from_unix(1_700_000_000);
        assert_eq!(storage.count_admin_users().unwrap(), 0);

        storage.insert_admin_user(&admin(now)).unwrap();
        assert_eq!(storage.count_admin_users().unwrap(), 1);
        assert!(storage.insert_admin_user(&admin(now)).is_err());

        let loaded = storage.get_admin_by_username("admin").unwrap().unwrap();
        assert_eq!(loaded.id, "u-1");

        let renamed = AdminUserRow {
            username: "root".to_string(),
            ..loaded
        };
        assert!(storage.update_admin_credentials(&renamed).unwrap());
        assert!(storage.get_admin_by_username("admin").unwrap().is_none());
        assert_eq!(
            storage.get_admin_by_id("u-1").unwrap().unwrap().username,
            "root"
        );
    }

    #[test]
    fn test_session_lifecycle() {
        let storage = test_storage();
        let now = from_unix(1_700_000_000);
        storage.insert_admin_user(&admin(now)).unwrap();

        for (token, ttl) in [("live", 24), ("stale", -1), ("other", 24)] {
            storage
                .insert_session(&SessionRow {
                    token_hash: token.to_string(),
                    user_id: "u-1".to_string(),
                    created_at: now,
                    expires_at: now + Duration::hours(ttl),
                })
                .unwrap();
        }

        assert_eq!(storage.purge_expired_sessions(now).unwrap(), 1);
        assert!(storage.get_session("stale").unwrap().is_none());

        assert_eq!(storage.delete_other_sessions("u-1", "live").unwrap(), 1);
        assert!(storage.get_session("other").unwrap().is_none());

        assert!(storage.get_session("live").unwrap().is_some());
        assert!(storage.delete_session("live").unwrap());
        assert!(!storage.delete_session("live").unwrap());
    }
}
