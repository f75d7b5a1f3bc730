//! Dashboard statistics: portfolio completeness and recent activity.
//!
//! A snapshot is computed fresh on every call from nine independent counts.
//! The recent window only applies to projects and messages; experiences and
//! skills report totals only.

use chrono::{DateTime, Days, Utc};
use serde::Serialize;

use crate::auth::Session;
use crate::error::ApiError;
use crate::storage::{Storage, StorageError};

/// Number of content areas that contribute to the completion percentage.
pub const TRACKED_MODULES: u32 = 5;

/// Width of the "recent" window, in calendar days.
pub const RECENT_WINDOW_DAYS: u64 = 7;

/// One counting read against the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatQuery {
    Projects,
    ProjectsSince(DateTime<Utc>),
    Experiences,
    Skills,
    Messages,
    UnreadMessages,
    MessagesSince(DateTime<Utc>),
    Profile,
    ContactInfo,
}

/// Anything that can answer counting queries. [`Storage`] is the production
/// implementation.
pub trait StatsSource {
    fn count(&self, query: StatQuery) -> Result<u64, StorageError>;
}

impl StatsSource for Storage {
    fn count(&self, query: StatQuery) -> Result<u64, StorageError> {
        match query {
            StatQuery::Projects => self.count_projects(None),
            StatQuery::ProjectsSince(since) => self.count_projects(Some(since)),
            StatQuery::Experiences => self.count_experiences(),
            StatQuery::Skills => self.count_skills(),
            StatQuery::Messages => self.count_messages(None),
            StatQuery::UnreadMessages => self.count_unread_messages(),
            StatQuery::MessagesSince(since) => self.count_messages(Some(since)),
            StatQuery::Profile => self.count_profiles(),
            StatQuery::ContactInfo => self.count_contact_info(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub total: u64,
    pub recent: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalOnly {
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub total: u64,
    pub unread: u64,
    pub recent: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub percentage: u32,
    pub completed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub projects: ProjectStats,
    pub experiences: TotalOnly,
    pub skills: TotalOnly,
    pub messages: MessageStats,
    pub profile: Presence,
    pub contact_info: Presence,
    pub completion: Completion,
}

/// Lower bound of the recent window: `now` minus seven calendar days, time of
/// day preserved. Rows created at exactly this instant count as recent.
pub fn recent_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_days(Days::new(RECENT_WINDOW_DAYS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Completion over the tracked modules, rounded to the nearest integer.
pub fn completion(modules: [bool; TRACKED_MODULES as usize]) -> Completion {
    let completed = modules.iter().filter(|done| **done).count() as u32;
    let percentage = (100.0 * f64::from(completed) / f64::from(TRACKED_MODULES)).round() as u32;
    Completion {
        percentage: percentage.min(100),
        completed,
        total: TRACKED_MODULES,
    }
}

/// Compute a snapshot for an authenticated admin.
///
/// Without a session this fails with [`ApiError::Unauthorized`] before any
/// read is issued. Any failed read fails the whole snapshot.
pub fn compute_stats<S: StatsSource + ?Sized>(
    session: Option<&Session>,
    source: &S,
    now: DateTime<Utc>,
) -> Result<StatsSnapshot, ApiError> {
    if session.is_none() {
        return Err(ApiError::Unauthorized);
    }
    let since = recent_cutoff(now);
    gather(source, since).map_err(|e| ApiError::upstream("failed to compute statistics", e))
}

fn gather<S: StatsSource + ?Sized>(
    source: &S,
    since: DateTime<Utc>,
) -> Result<StatsSnapshot, StorageError> {
    // The reads are independent of one another; order does not matter.
    let projects = source.count(StatQuery::Projects)?;
    let experiences = source.count(StatQuery::Experiences)?;
    let skills = source.count(StatQuery::Skills)?;
    let messages = source.count(StatQuery::Messages)?;
    let unread = source.count(StatQuery::UnreadMessages)?;
    let profile_exists = source.count(StatQuery::Profile)? > 0;
    let contact_info_exists = source.count(StatQuery::ContactInfo)? > 0;
    let recent_projects = source.count(StatQuery::ProjectsSince(since))?;
    let recent_messages = source.count(StatQuery::MessagesSince(since))?;

    Ok(StatsSnapshot {
        projects: ProjectStats {
            total: projects,
            recent: recent_projects,
        },
        experiences: TotalOnly { total: experiences },
        skills: TotalOnly { total: skills },
        messages: MessageStats {
            total: messages,
            unread,
            recent: recent_messages,
        },
        profile: Presence {
            exists: profile_exists,
        },
        contact_info: Presence {
            exists: contact_info_exists,
        },
        completion: completion([
            profile_exists,
            projects > 0,
            experiences > 0,
            skills > 0,
            contact_info_exists,
        ]),
    })
}
