//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::web_server::state::SharedState;
use crate::web_server::utils::api_error;

pub async fn health_handler(State(state): State<SharedState>) -> Response {
    let storage = state.storage.lock().await;
    match storage.ping() {
        Ok(()) => {
            let body = serde_json::json!({
                "status": "ok",
                "database": "ok",
                "mail": state.notifier.is_some(),
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "health check: database unreachable");
            api_error(StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
