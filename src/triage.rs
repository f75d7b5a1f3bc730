//! Contact message triage: paging through stored messages and toggling
//! their read state.

use std::str::FromStr;

use serde::Serialize;

use crate::error::ApiError;
use crate::storage::{ContactMessageRow, Storage};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated page request. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn positive(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

impl PageRequest {
    /// Build from raw query strings. Absent, non-numeric or non-positive
    /// values fall back to the defaults.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self {
            page: positive(page, DEFAULT_PAGE),
            page_size: positive(page_size, DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }

    /// Number of items this page holds out of `total`.
    pub fn slice_len(&self, total: u64) -> u64 {
        total
            .saturating_sub(self.offset())
            .min(u64::from(self.page_size))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<ContactMessageRow>,
    pub total: u64,
    pub total_pages: u64,
    pub page: u32,
    pub page_size: u32,
}

/// One page of messages, newest first. A page past the end is empty, not an
/// error.
pub fn list_messages(storage: &Storage, request: PageRequest) -> Result<MessagePage, ApiError> {
    let total = storage.count_messages(None)?;
    let messages = if request.slice_len(total) == 0 {
        Vec::new()
    } else {
        storage.list_contact_messages(request.offset(), request.page_size)?
    };
    Ok(MessagePage {
        messages,
        total,
        total_pages: request.total_pages(total),
        page: request.page,
        page_size: request.page_size,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAction {
    Read,
    Unread,
}

impl FromStr for ReadAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(ReadAction::Read),
            "unread" => Ok(ReadAction::Unread),
            other => Err(ApiError::InvalidRequest(format!(
                "action: expected 'read' or 'unread', got '{other}'"
            ))),
        }
    }
}

/// A validated read-state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRead {
    pub id: String,
    pub read: bool,
}

impl MarkRead {
    pub fn parse(id: Option<String>, action: Option<String>) -> Result<Self, ApiError> {
        let id = id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::invalid("id: required"))?;
        let action: ReadAction = action
            .ok_or_else(|| ApiError::invalid("action: required"))?
            .parse()?;
        Ok(Self {
            id,
            read: action == ReadAction::Read,
        })
    }
}

/// Write the read flag. Writing the current value is still a write.
pub fn set_message_read(storage: &Storage, change: &MarkRead) -> Result<(), ApiError> {
    if storage.set_message_read(&change.id, change.read)? {
        Ok(())
    } else {
        Err(ApiError::not_found("message"))
    }
}
