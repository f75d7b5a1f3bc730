//! Work experience entries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::ExperienceRow;
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::{now_secs, success};
use crate::web_server::validation::{date, optional, required, RequestSchema, ValidJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRequest {
    company: String,
    role: String,
    description: String,
    location: Option<String>,
    start_date: String,
    end_date: Option<String>,
    #[serde(default)]
    current: bool,
}

pub struct ExperienceInput {
    company: String,
    role: String,
    description: String,
    location: Option<String>,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    current: bool,
}

impl RequestSchema for ExperienceRequest {
    type Valid = ExperienceInput;

    fn validate(self) -> Result<ExperienceInput, ApiError> {
        let start_date = date("startDate", Some(self.start_date))?
            .ok_or_else(|| ApiError::invalid("startDate: required"))?;
        // A current position has no end date.
        let end_date = if self.current {
            None
        } else {
            date("endDate", self.end_date)?
        };
        if end_date.is_some_and(|end| end < start_date) {
            return Err(ApiError::invalid("endDate: before startDate"));
        }
        Ok(ExperienceInput {
            company: required("company", self.company)?,
            role: required("role", self.role)?,
            description: required("description", self.description)?,
            location: optional("location", self.location)?,
            start_date,
            end_date,
            current: self.current,
        })
    }
}

pub async fn list_experiences_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ExperienceRow>>, ApiError> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.list_experiences()?))
}

pub async fn get_experience_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ExperienceRow>, ApiError> {
    let storage = state.storage.lock().await;
    storage
        .get_experience(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("experience"))
}

pub async fn create_experience_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(input): ValidJson<ExperienceRequest>,
) -> Result<Response, ApiError> {
    let now = now_secs();
    let row = ExperienceRow {
        id: Uuid::new_v4().to_string(),
        company: input.company,
        role: input.role,
        description: input.description,
        location: input.location,
        start_date: input.start_date,
        end_date: input.end_date,
        current: input.current,
        created_at: now,
        updated_at: now,
    };
    state.storage.lock().await.insert_experience(&row)?;
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub async fn update_experience_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<ExperienceRequest>,
) -> Result<Json<ExperienceRow>, ApiError> {
    let storage = state.storage.lock().await;
    let existing = storage
        .get_experience(&id)?
        .ok_or_else(|| ApiError::not_found("experience"))?;
    let row = ExperienceRow {
        company: input.company,
        role: input.role,
        description: input.description,
        location: input.location,
        start_date: input.start_date,
        end_date: input.end_date,
        current: input.current,
        updated_at: now_secs(),
        ..existing
    };
    storage.update_experience(&row)?;
    Ok(Json(row))
}

pub async fn delete_experience_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let storage = state.storage.lock().await;
    if storage.delete_experience(&id)? {
        Ok(success())
    } else {
        Err(ApiError::not_found("experience"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: Option<&str>, current: bool) -> ExperienceRequest {
        ExperienceRequest {
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            description: "Built things".to_string(),
            location: None,
            start_date: start.to_string(),
            end_date: end.map(String::from),
            current,
        }
    }

    #[test]
    fn test_date_rules() {
        assert!(request("2022-01-01", Some("2023-01-01"), false).validate().is_ok());
        assert!(request("2022-01-01", Some("2021-01-01"), false).validate().is_err());
        assert!(request("", None, true).validate().is_err());

        let current = request("2022-01-01", Some("2023-01-01"), true)
            .validate()
            .unwrap();
        assert!(current.end_date.is_none());
    }
}
