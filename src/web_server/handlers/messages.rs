//! Contact message triage for the admin inbox.

use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::logging::short_id;
use crate::triage::{self, MarkRead, MessagePage, PageRequest};
use crate::web_server::extract::AdminSession;
use crate::web_server::state::SharedState;
use crate::web_server::utils::success;
use crate::web_server::validation::{RequestSchema, ValidJson};

/// First value of `key` in the query. Repeats are ignored.
fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Paging comes from raw query pairs so malformed or repeated values fall
/// back to defaults instead of rejecting the request.
pub async fn list_messages_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<MessagePage>, ApiError> {
    let request = PageRequest::parse(first_value(&pairs, "page"), first_value(&pairs, "pageSize"));
    let storage = state.storage.lock().await;
    triage::list_messages(&storage, request).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    id: Option<String>,
    action: Option<String>,
}

impl RequestSchema for MarkReadRequest {
    type Valid = MarkRead;

    fn validate(self) -> Result<MarkRead, ApiError> {
        MarkRead::parse(self.id, self.action)
    }
}

pub async fn mark_read_handler(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    ValidJson(change): ValidJson<MarkReadRequest>,
) -> Result<Response, ApiError> {
    let storage = state.storage.lock().await;
    triage::set_message_read(&storage, &change)?;
    tracing::debug!(message = short_id(&change.id), read = change.read, "message read state set");
    Ok(success())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_value_ignores_repeats() {
        let query = pairs(&[("page", "2"), ("pageSize", "5"), ("page", "9")]);
        assert_eq!(first_value(&query, "page"), Some("2"));
        assert_eq!(first_value(&query, "pageSize"), Some("5"));
        assert_eq!(first_value(&query, "pagesize"), None);
        assert_eq!(first_value(&[], "page"), None);
    }
}
