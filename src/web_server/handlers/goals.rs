//! Personal and career goals.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::GoalRow;
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::{now_secs, success};
use crate::web_server::validation::{date, required, RequestSchema, ValidJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    title: String,
    description: String,
    target_date: Option<String>,
    #[serde(default)]
    completed: bool,
}

pub struct GoalInput {
    title: String,
    description: String,
    target_date: Option<NaiveDate>,
    completed: bool,
}

impl RequestSchema for GoalRequest {
    type Valid = GoalInput;

    fn validate(self) -> Result<GoalInput, ApiError> {
        Ok(GoalInput {
            title: required("title", self.title)?,
            description: required("description", self.description)?,
            target_date: date("targetDate", self.target_date)?,
            completed: self.completed,
        })
    }
}

pub async fn list_goals_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GoalRow>>, ApiError> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.list_goals()?))
}

pub async fn get_goal_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GoalRow>, ApiError> {
    let storage = state.storage.lock().await;
    storage
        .get_goal(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("goal"))
}

pub async fn create_goal_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(input): ValidJson<GoalRequest>,
) -> Result<Response, ApiError> {
    let now = now_secs();
    let row = GoalRow {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        target_date: input.target_date,
        completed: input.completed,
        created_at: now,
        updated_at: now,
    };
    state.storage.lock().await.insert_goal(&row)?;
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub async fn update_goal_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<GoalRequest>,
) -> Result<Json<GoalRow>, ApiError> {
    let storage = state.storage.lock().await;
    let existing = storage
        .get_goal(&id)?
        .ok_or_else(|| ApiError::not_found("goal"))?;
    let row = GoalRow {
        title: input.title,
        description: input.description,
        target_date: input.target_date,
        completed: input.completed,
        updated_at: now_secs(),
        ..existing
    };
    storage.update_goal(&row)?;
    Ok(Json(row))
}

pub async fn delete_goal_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let storage = state.storage.lock().await;
    if storage.delete_goal(&id)? {
        Ok(success())
    } else {
        Err(ApiError::not_found("goal"))
    }
}
