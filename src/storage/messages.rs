//! Contact messages submitted through the public contact form.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{from_unix, to_unix, Storage, StorageError};

/// Contact message row stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, name, email, subject, message, is_read, created_at";

impl ContactMessageRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            subject: row.get(3)?,
            message: row.get(4)?,
            is_read: row.get::<_, i32>(5)? != 0,
            created_at: from_unix(row.get(6)?),
        })
    }
}

impl Storage {
    pub fn insert_contact_message(&self, row: &ContactMessageRow) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO contact_messages
             (id, name, email, subject, message, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.id,
                row.name,
                row.email,
                row.subject,
                row.message,
                row.is_read as i32,
                to_unix(&row.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_contact_message(&self, id: &str) -> Result<Option<ContactMessageRow>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM contact_messages WHERE id = ?1"))?;
        let row = stmt
            .query_row(params![id], ContactMessageRow::from_row)
            .optional()?;
        Ok(row)
    }

    /// One page of messages, newest first. `id` breaks ties between messages
    /// created in the same second so the order is stable across calls.
    pub fn list_contact_messages(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<ContactMessageRow>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM contact_messages
             ORDER BY created_at DESC, id DESC
             LIMIT ?1 OFFSET ?2"
        ))?;
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit as i64, offset], ContactMessageRow::from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Set the read flag. Returns `false` when no message has that id.
    pub fn set_message_read(&self, id: &str, read: bool) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "UPDATE contact_messages SET is_read = ?1 WHERE id = ?2",
            params![read as i32, id],
        )?;
        Ok(affected > 0)
    }

    pub fn count_messages(&self, since: Option<DateTime<Utc>>) -> Result<u64, StorageError> {
        self.count_rows("contact_messages", since)
    }

    pub fn count_unread_messages(&self) -> Result<u64, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM contact_messages WHERE is_read = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::storage::tests::test_storage;

    fn message(id: &str, created_at: DateTime<Utc>) -> ContactMessageRow {
        ContactMessageRow {
            id: id.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: Some("Hello".to_string()),
            message: "Nice portfolio".to_string(),
            is_read: false,
            created_at,
        }
    }

    #[test]
    fn test_contact_message_crud() {
        let storage = test_storage();
        let now = from_unix(1_700_000_000);
        storage.insert_contact_message(&message("m-1", now)).unwrap();

        let loaded = storage.get_contact_message("m-1").unwrap().unwrap();
        assert_eq!(loaded.email, "ada@example.com");
        assert!(!loaded.is_read);

        assert!(storage.set_message_read("m-1", true).unwrap());
        assert!(storage.get_contact_message("m-1").unwrap().unwrap().is_read);

        // Same value again is still a successful write
        assert!(storage.set_message_read("m-1", true).unwrap());

        assert!(storage.set_message_read("m-1", false).unwrap());
        assert!(!storage.get_contact_message("m-1").unwrap().unwrap().is_read);

        assert!(!storage.set_message_read("missing", true).unwrap());
        assert!(storage.get_contact_message("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_is_newest_first_with_stable_ties() {
        let storage = test_storage();
        let base = from_unix(1_700_000_000);
        storage.insert_contact_message(&message("a", base)).unwrap();
        storage
            .insert_contact_message(&message("c", base + Duration::seconds(10)))
            .unwrap();
        storage
            .insert_contact_message(&message("b", base + Duration::seconds(10)))
            .unwrap();

        let ids: Vec<String> = storage
            .list_contact_messages(0, 10)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let page: Vec<String> = storage
            .list_contact_messages(1, 1)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(page, vec!["b"]);

        assert!(storage.list_contact_messages(3, 10).unwrap().is_empty());
    }

    #[test]
    fn test_message_counts() {
        let storage = test_storage();
        let base = from_unix(1_700_000_000);
        for i in 0..4 {
            storage
                .insert_contact_message(&message(&format!("m-{i}"), base + Duration::days(i)))
                .unwrap();
        }
        storage.set_message_read("m-0", true).unwrap();

        assert_eq!(storage.count_messages(None).unwrap(), 4);
        assert_eq!(storage.count_unread_messages().unwrap(), 3);
        // Lower bound is inclusive
        assert_eq!(
            storage.count_messages(Some(base + Duration::days(2))).unwrap(),
            2
        );
    }
}
