//! Achievements: awards, certifications, talks.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::AchievementRow;
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::{now_secs, success};
use crate::web_server::validation::{date, link, required, RequestSchema, ValidJson};

#[derive(Debug, Deserialize)]
pub struct AchievementRequest {
    title: String,
    description: String,
    date: Option<String>,
    link: Option<String>,
}

pub struct AchievementInput {
    title: String,
    description: String,
    date: Option<NaiveDate>,
    link: Option<String>,
}

impl RequestSchema for AchievementRequest {
    type Valid = AchievementInput;

    fn validate(self) -> Result<AchievementInput, ApiError> {
        Ok(AchievementInput {
            title: required("title", self.title)?,
            description: required("description", self.description)?,
            date: date("date", self.date)?,
            link: link("link", self.link)?,
        })
    }
}

pub async fn list_achievements_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AchievementRow>>, ApiError> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.list_achievements()?))
}

pub async fn get_achievement_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<AchievementRow>, ApiError> {
    let storage = state.storage.lock().await;
    storage
        .get_achievement(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("achievement"))
}

pub async fn create_achievement_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(input): ValidJson<AchievementRequest>,
) -> Result<Response, ApiError> {
    let now = now_secs();
    let row = AchievementRow {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        date: input.date,
        link: input.link,
        created_at: now,
        updated_at: now,
    };
    state.storage.lock().await.insert_achievement(&row)?;
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub async fn update_achievement_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<AchievementRequest>,
) -> Result<Json<AchievementRow>, ApiError> {
    let storage = state.storage.lock().await;
    let existing = storage
        .get_achievement(&id)?
        .ok_or_else(|| ApiError::not_found("achievement"))?;
    let row = AchievementRow {
        title: input.title,
        description: input.description,
        date: input.date,
        link: input.link,
        updated_at: now_secs(),
        ..existing
    };
    storage.update_achievement(&row)?;
    Ok(Json(row))
}

pub async fn delete_achievement_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let storage = state.storage.lock().await;
    if storage.delete_achievement(&id)? {
        Ok(success())
    } else {
        Err(ApiError::not_found("achievement"))
    }
}
