//! Shared helpers for handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SubsecRound, Utc};

use crate::uploads::{UploadStore, PUBLIC_PREFIX};

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, axum::Json(body)).into_response()
}

/// Current time at the precision the database stores (whole seconds).
pub fn now_secs() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// `{"success": true}`
pub fn success() -> Response {
    axum::Json(serde_json::json!({ "success": true })).into_response()
}

/// Remove a previously uploaded image that is no longer referenced. Only
/// paths under `/uploads/` are touched. Best effort: failures are logged and otherwise ignored.
pub async fn discard_upload(uploads: &UploadStore, old: Option<&str>, new: Option<&str>) {
    let Some(old) = old else { return };
    if Some(old) == new || !old.starts_with(PUBLIC_PREFIX) {
        return;
    }
    match uploads.delete(old).await {
        Ok(true) => tracing::debug!(path = old, "removed replaced upload"),
        Ok(false) => {}
        Err(e) => tracing::warn!(path = old, error = %e, "could not remove old upload"),
    }
}
