//! The singleton public profile.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::{Availability, ProfileRow};
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::{discard_upload, now_secs};
use crate::web_server::validation::{link, optional, required, RequestSchema, ValidJson};

/// `null` until the profile is first saved.
pub async fn get_profile_handler(
    State(state): State<SharedState>,
) -> Result<Json<Option<ProfileRow>>, ApiError> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.get_profile()?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    name: String,
    about: String,
    headline: String,
    #[serde(default)]
    availability: Option<String>,
    profile_image: Option<String>,
    location: Option<String>,
}

#[derive(Debug)]
pub struct ProfileInput {
    name: String,
    about: String,
    headline: String,
    availability: Availability,
    profile_image: Option<String>,
    location: Option<String>,
}

impl RequestSchema for ProfileRequest {
    type Valid = ProfileInput;

    fn validate(self) -> Result<ProfileInput, ApiError> {
        let availability = match optional("availability", self.availability)? {
            None => Availability::Available,
            Some(raw) => raw
                .parse()
                .map_err(|e: String| ApiError::InvalidRequest(format!("availability: {e}")))?,
        };
        Ok(ProfileInput {
            name: required("name", self.name)?,
            about: required("about", self.about)?,
            headline: required("headline", self.headline)?,
            availability,
            profile_image: link("profileImage", self.profile_image)?,
            location: optional("location", self.location)?,
        })
    }
}

pub async fn update_profile_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(input): ValidJson<ProfileRequest>,
) -> Result<Json<ProfileRow>, ApiError> {
    let now = now_secs();
    let (row, previous_image) = {
        let storage = state.storage.lock().await;
        let existing = storage.get_profile()?;
        let (id, created_at, previous_image) = match existing {
            Some(p) => (p.id, p.created_at, p.profile_image),
            None => (Uuid::new_v4().to_string(), now, None),
        };
        let row = ProfileRow {
            id,
            name: input.name,
            about: input.about,
            headline: input.headline,
            availability: input.availability,
            profile_image: input.profile_image,
            location: input.location,
            created_at,
            updated_at: now,
        };
        storage.upsert_profile(&row)?;
        (row, previous_image)
    };

    discard_upload(
        &state.uploads,
        previous_image.as_deref(),
        row.profile_image.as_deref(),
    )
    .await;
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(availability: Option<&str>) -> ProfileRequest {
        ProfileRequest {
            name: "Ada".to_string(),
            about: "Engineer".to_string(),
            headline: "Builds things".to_string(),
            availability: availability.map(String::from),
            profile_image: None,
            location: None,
        }
    }

    #[test]
    fn test_availability_validation() {
        assert_eq!(
            request(None).validate().unwrap().availability,
            Availability::Available
        );
        assert_eq!(
            request(Some("freelance")).validate().unwrap().availability,
            Availability::Freelance
        );
        let err = request(Some("retired")).validate().unwrap_err();
        assert!(err.to_string().starts_with("availability:"));
    }
}
