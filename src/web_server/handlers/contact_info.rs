//! The singleton public contact details.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::ContactInfoRow;
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::now_secs;
use crate::web_server::validation::{email, link, optional, RequestSchema, ValidJson};

pub async fn get_contact_info_handler(
    State(state): State<SharedState>,
) -> Result<Json<Option<ContactInfoRow>>, ApiError> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.get_contact_info()?))
}

#[derive(Debug, Deserialize)]
pub struct ContactInfoRequest {
    email: String,
    phone: Option<String>,
    location: Option<String>,
    linkedin: Option<String>,
    github: Option<String>,
    twitter: Option<String>,
    website: Option<String>,
}

impl RequestSchema for ContactInfoRequest {
    type Valid = ContactInfoRequest;

    fn validate(self) -> Result<ContactInfoRequest, ApiError> {
        Ok(ContactInfoRequest {
            email: email("email", self.email)?,
            phone: optional("phone", self.phone)?,
            location: optional("location", self.location)?,
            linkedin: link("linkedin", self.linkedin)?,
            github: link("github", self.github)?,
            twitter: link("twitter", self.twitter)?,
            website: link("website", self.website)?,
        })
    }
}

pub async fn update_contact_info_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(input): ValidJson<ContactInfoRequest>,
) -> Result<Json<ContactInfoRow>, ApiError> {
    let now = now_secs();
    let storage = state.storage.lock().await;
    let (id, created_at) = match storage.get_contact_info()? {
        Some(existing) => (existing.id, existing.created_at),
        None => (Uuid::new_v4().to_string(), now),
    };
    let row = ContactInfoRow {
        id,
        email: input.email,
        phone: input.phone,
        location: input.location,
        linkedin: input.linkedin,
        github: input.github,
        twitter: input.twitter,
        website: input.website,
        created_at,
        updated_at: now,
    };
    storage.upsert_contact_info(&row)?;
    Ok(Json(row))
}
