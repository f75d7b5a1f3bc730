//! Image upload, download and removal.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::multipart::MultipartRejection;
use axum_extra::extract::Multipart;

use crate::error::ApiError;
use crate::uploads::{StoredUpload, MAX_UPLOAD_SIZE};
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::success;

/// Accepts a multipart form with a single `file` field.
pub async fn upload_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(ApiError::PayloadTooLarge(MAX_UPLOAD_SIZE))
            }
            Err(e) => return Err(ApiError::InvalidRequest(format!("file: {}", e.body_text()))),
        };
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(ApiError::PayloadTooLarge(MAX_UPLOAD_SIZE))
            }
            Err(e) => return Err(ApiError::InvalidRequest(format!("file: {}", e.body_text()))),
        };
        file = Some((content_type, bytes.to_vec()));
    }

    let (content_type, data) = file.ok_or_else(|| ApiError::invalid("file: required"))?;
    let stored: StoredUpload = state.uploads.save(&content_type, &data).await?;
    tracing::info!(name = %stored.name, size = stored.size, "image uploaded");
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

pub async fn serve_upload_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let (data, mime) = state
        .uploads
        .read(&name)
        .await?
        .ok_or_else(|| ApiError::not_found("upload"))?;
    let headers = [
        (header::CONTENT_TYPE, mime),
        (
            header::CACHE_CONTROL,
            "public, max-age=31536000, immutable".to_string(),
        ),
    ];
    Ok((StatusCode::OK, headers, data).into_response())
}

pub async fn delete_upload_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    if state.uploads.delete(&name).await? {
        tracing::info!(name = %name, "upload deleted");
        Ok(success())
    } else {
        Err(ApiError::not_found("upload"))
    }
}
