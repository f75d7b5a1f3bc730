//! HTTP handlers, one module per resource.

pub mod achievements;
pub mod auth;
pub mod contact;
pub mod contact_info;
pub mod dashboard;
pub mod experiences;
pub mod goals;
pub mod health;
pub mod messages;
pub mod profile;
pub mod projects;
pub mod skills;
pub mod uploads;
