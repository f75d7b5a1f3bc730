//! Public contact form.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::logging::short_id;
use crate::storage::ContactMessageRow;
use crate::web_server::state::SharedState;
use crate::web_server::utils::now_secs;
use crate::web_server::validation::{email, optional, required, RequestSchema, ValidJson};

const MAX_MESSAGE_LEN: usize = 5_000;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
}

pub struct ContactForm {
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
}

impl RequestSchema for ContactRequest {
    type Valid = ContactForm;

    fn validate(self) -> Result<ContactForm, ApiError> {
        let message = required("message", self.message)?;
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(ApiError::InvalidRequest(format!(
                "message: at most {MAX_MESSAGE_LEN} characters"
            )));
        }
        Ok(ContactForm {
            name: required("name", self.name)?,
            email: email("email", self.email)?,
            subject: optional("subject", self.subject)?,
            message,
        })
    }
}

/// Persist the message, then notify the admin. A notification failure is
/// reported to the sender even though the message is already stored.
pub async fn submit_contact_handler(
    State(state): State<SharedState>,
    ValidJson(form): ValidJson<ContactRequest>,
) -> Result<Response, ApiError> {
    let row = ContactMessageRow {
        id: Uuid::new_v4().to_string(),
        name: form.name,
        email: form.email,
        subject: form.subject,
        message: form.message,
        is_read: false,
        created_at: now_secs(),
    };

    {
        let storage = state.storage.lock().await;
        storage.insert_contact_message(&row)?;
    }
    tracing::info!(message = short_id(&row.id), "contact message stored");

    match &state.notifier {
        Some(notifier) => notifier
            .contact_received(&row)
            .await
            .map_err(|e| ApiError::upstream("failed to send contact notification", e))?,
        None => tracing::info!("mail not configured, skipping contact notification"),
    }

    let body = serde_json::json!({ "success": true, "id": row.id });
    Ok((StatusCode::CREATED, axum::Json(body)).into_response())
}
