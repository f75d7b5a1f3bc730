//! Portfolio projects.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::logging::short_id;
use crate::storage::ProjectRow;
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::{discard_upload, now_secs, success};
use crate::web_server::validation::{link, required, RequestSchema, ValidJson};

const MAX_TECH_STACK: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    title: String,
    description: String,
    #[serde(default)]
    tech_stack: Vec<String>,
    repo_url: Option<String>,
    live_url: Option<String>,
    image: Option<String>,
    #[serde(default)]
    featured: bool,
}

impl RequestSchema for ProjectRequest {
    type Valid = ProjectRequest;

    fn validate(self) -> Result<ProjectRequest, ApiError> {
        let tech_stack: Vec<String> = self
            .tech_stack
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tech_stack.len() > MAX_TECH_STACK {
            return Err(ApiError::InvalidRequest(format!(
                "techStack: at most {MAX_TECH_STACK} entries"
            )));
        }
        Ok(ProjectRequest {
            title: required("title", self.title)?,
            description: required("description", self.description)?,
            tech_stack,
            repo_url: link("repoUrl", self.repo_url)?,
            live_url: link("liveUrl", self.live_url)?,
            image: link("image", self.image)?,
            featured: self.featured,
        })
    }
}

pub async fn list_projects_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ProjectRow>>, ApiError> {
    let storage = state.storage.lock().await;
    Ok(Json(storage.list_projects()?))
}

pub async fn get_project_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectRow>, ApiError> {
    let storage = state.storage.lock().await;
    storage
        .get_project(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("project"))
}

pub async fn create_project_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(req): ValidJson<ProjectRequest>,
) -> Result<Response, ApiError> {
    let now = now_secs();
    let row = ProjectRow {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        description: req.description,
        tech_stack: req.tech_stack,
        repo_url: req.repo_url,
        live_url: req.live_url,
        image: req.image,
        featured: req.featured,
        created_at: now,
        updated_at: now,
    };
    state.storage.lock().await.insert_project(&row)?;
    tracing::info!(project = short_id(&row.id), "project created");
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub async fn update_project_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<ProjectRequest>,
) -> Result<Json<ProjectRow>, ApiError> {
    let (row, previous_image) = {
        let storage = state.storage.lock().await;
        let existing = storage
            .get_project(&id)?
            .ok_or_else(|| ApiError::not_found("project"))?;
        let previous_image = existing.image.clone();
        let row = ProjectRow {
            title: req.title,
            description: req.description,
            tech_stack: req.tech_stack,
            repo_url: req.repo_url,
            live_url: req.live_url,
            image: req.image,
            featured: req.featured,
            updated_at: now_secs(),
            ..existing
        };
        storage.update_project(&row)?;
        (row, previous_image)
    };

    discard_upload(&state.uploads, previous_image.as_deref(), row.image.as_deref()).await;
    Ok(Json(row))
}

pub async fn delete_project_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = {
        let storage = state.storage.lock().await;
        let existing = storage
            .get_project(&id)?
            .ok_or_else(|| ApiError::not_found("project"))?;
        storage.delete_project(&id)?;
        existing.image
    };
    tracing::info!(project = short_id(&id), "project deleted");

    discard_upload(&state.uploads, image.as_deref(), None).await;
    Ok(success())
}
