//! Singleton records: the owner's profile and their contact details.
//!
//! Both tables hold zero or one row. Existence of the row is what the
//! dashboard counts as "module complete".

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{from_unix, to_unix, Storage, StorageError};

/// Availability banner shown on the public profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    NotAvailable,
    Freelance,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::NotAvailable => "not_available",
            Availability::Freelance => "freelance",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Availability::Available),
            "not_available" => Ok(Availability::NotAvailable),
            "freelance" => Ok(Availability::Freelance),
            other => Err(format!("unknown availability '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow {
    pub id: String,
    pub name: String,
    pub about: String,
    pub headline: String,
    pub availability: Availability,
    pub profile_image: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoRow {
    pub id: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<(ProfileRow, String)> {
    Ok((
        ProfileRow {
            id: row.get(0)?,
            name: row.get(1)?,
            about: row.get(2)?,
            headline: row.get(3)?,
            availability: Availability::Available,
            profile_image: row.get(5)?,
            location: row.get(6)?,
            created_at: from_unix(row.get(7)?),
            updated_at: from_unix(row.get(8)?),
        },
        row.get(4)?,
    ))
}

fn contact_info_from_row(row: &Row<'_>) -> rusqlite::Result<ContactInfoRow> {
    Ok(ContactInfoRow {
        id: row.get(0)?,
        email: row.get(1)?,
        phone: row.get(2)?,
        location: row.get(3)?,
        linkedin: row.get(4)?,
        github: row.get(5)?,
        twitter: row.get(6)?,
        website: row.get(7)?,
        created_at: from_unix(row.get(8)?),
        updated_at: from_unix(row.get(9)?),
    })
}

impl Storage {
    // -----------------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------------

    /// The profile, if one has been saved. When more than one row exists the
    /// oldest wins.
    pub fn get_profile(&self) -> Result<Option<ProfileRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, about, headline, availability, profile_image, location,
                    created_at, updated_at
             FROM profile ORDER BY created_at, id LIMIT 1",
        )?;
        match stmt.query_row([], profile_from_row).optional()? {
            None => Ok(None),
            Some((mut profile, availability)) => {
                profile.availability = availability
                    .parse()
                    .map_err(StorageError::Corrupt)?;
                Ok(Some(profile))
            }
        }
    }

    /// Insert or replace the profile row with the given id.
    pub fn upsert_profile(&self, row: &ProfileRow) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO profile
             (id, name, about, headline, availability, profile_image, location,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.id,
                row.name,
                row.about,
                row.headline,
                row.availability.as_str(),
                row.profile_image,
                row.location,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn count_profiles(&self) -> Result<u64, StorageError> {
        self.count_rows("profile", None)
    }

    // -----------------------------------------------------------------------
    // Contact info
    // -----------------------------------------------------------------------

    pub fn get_contact_info(&self) -> Result<Option<ContactInfoRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, phone, location, linkedin, github, twitter, website,
                    created_at, updated_at
             FROM contact_info ORDER BY created_at, id LIMIT 1",
        )?;
        Ok(stmt.query_row([], contact_info_from_row).optional()?)
    }

    pub fn upsert_contact_info(&self, row: &ContactInfoRow) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO contact_info
             (id, email, phone, location, linkedin, github, twitter, website,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row.id,
                row.email,
                row.phone,
                row.location,
                row.linkedin,
                row.github,
                row.twitter,
                row.website,
                to_unix(&row.created_at),
                to_unix(&row.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn count_contact_info(&self) -> Result<u64, StorageError> {
        self.count_rows("contact_info", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::test_storage;

    #[test]
    fn test_profile_upsert_keeps_single_row() {
        let storage = test_storage();
        assert!(storage.get_profile().unwrap().is_none());
        assert_eq!(storage.count_profiles().unwrap(), 0);

        let now = from_unix(1_700_000_000);
        let profile = ProfileRow {
            id: "me".to_string(),
            name: "Ada Lovelace".to_string(),
            about: "Analyst".to_string(),
            headline: "Engine programmer".to_string(),
            availability: Availability::Freelance,
            profile_image: None,
            location: Some("London".to_string()),
            created_at: now,
            updated_at: now,
        };
        storage.upsert_profile(&profile).unwrap();
        storage
            .upsert_profile(&ProfileRow {
                availability: Availability::NotAvailable,
                ..profile.clone()
            })
            .unwrap();

        let loaded = storage.get_profile().unwrap().unwrap();
        assert_eq!(loaded.availability, Availability::NotAvailable);
        assert_eq!(loaded.location.as_deref(), Some("London"));
        assert_eq!(storage.count_profiles().unwrap(), 1);
    }

    #[test]
    fn test_contact_info_upsert() {
        let storage = test_storage();
        assert!(storage.get_contact_info().unwrap().is_none());

        let now = from_unix(1_700_000_000);
        let info = ContactInfoRow {
            id: "ci".to_string(),
            email: "me@example.com".to_string(),
            phone: None,
            location: None,
            linkedin: None,
            github: Some("https://github.com/me".to_string()),
            twitter: None,
            website: None,
            created_at: now,
            updated_at: now,
        };
        storage.upsert_contact_info(&info).unwrap();
        assert_eq!(storage.count_contact_info().unwrap(), 1);
        assert_eq!(
            storage.get_contact_info().unwrap().unwrap().github.as_deref(),
            Some("https://github.com/me")
        );
    }

    #[test]
    fn test_availability_parse() {
        assert_eq!(
            "not_available".parse::<Availability>().unwrap(),
            Availability::NotAvailable
        );
        assert!("busy".parse::<Availability>().is_err());
        assert_eq!(Availability::Freelance.to_string(), "freelance");
    }
}
