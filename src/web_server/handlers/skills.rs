//! Skills with a 1 to 100 proficiency rating.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::SkillRow;
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::{now_secs, success};
use crate::web_server::validation::{proficiency, required, RequestSchema, ValidJson};

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    name: String,
    category: String,
    proficiency: i64,
}

pub struct SkillInput {
    name: String,
    category: String,
    proficiency: u8,
}

impl RequestSchema for SkillRequest {
    type Valid = SkillInput;

    fn validate(self) -> Result<SkillInput, ApiError> {
        Ok(SkillInput {
            name: required("name", self.name)?,
            category: required("category", self.category)?,
            proficiency: proficiency("proficiency", self.proficiency)?,
        })
    }
}

pub async fn list_skills_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SkillRow>>, ApiError> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.list_skills()?))
}

pub async fn get_skill_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SkillRow>, ApiError> {
    let storage = state.storage.lock().await;
    storage
        .get_skill(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("skill"))
}

pub async fn create_skill_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(input): ValidJson<SkillRequest>,
) -> Result<Response, ApiError> {
    let now = now_secs();
    let row = SkillRow {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        category: input.category,
        proficiency: input.proficiency,
        created_at: now,
        updated_at: now,
    };
    state.storage.lock().await.insert_skill(&row)?;
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub async fn update_skill_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<SkillRequest>,
) -> Result<Json<SkillRow>, ApiError> {
    let storage = state.storage.lock().await;
    let existing = storage
        .get_skill(&id)?
        .ok_or_else(|| ApiError::not_found("skill"))?;
    let row = SkillRow {
        name: input.name,
        category: input.category,
        proficiency: input.proficiency,
        updated_at: now_secs(),
        ..existing
    };
    storage.update_skill(&row)?;
    Ok(Json(row))
}

pub async fn delete_skill_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let storage = state.storage.lock().await;
    if storage.delete_skill(&id)? {
        Ok(success())
    } else {
        Err(ApiError::not_found("skill"))
    }
}
