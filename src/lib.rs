//! folio: backend for a personal portfolio site.
//!
//! Public read endpoints for portfolio content, a contact form, and an
//! admin surface with dashboard statistics and message triage. State lives
//! in SQLite; uploaded images live on disk.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod storage;
pub mod triage;
pub mod uploads;
pub mod web_server;
