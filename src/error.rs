//! Request-level error taxonomy and its mapping to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::AuthError;
use crate::mailer::MailError;
use crate::storage::StorageError;
use crate::uploads::UploadError;

/// Failures of the services a request depends on. Never shown to clients.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("upload exceeds the maximum size of {0} bytes")]
    PayloadTooLarge(u64),

    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    pub fn upstream(context: &'static str, source: impl Into<UpstreamError>) -> Self {
        ApiError::Upstream {
            context,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::upstream("storage failure", e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Storage(e) => e.into(),
            e => ApiError::upstream("authentication failure", e),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::UnsupportedType(ct) => {
                ApiError::InvalidRequest(format!("file: unsupported content type '{ct}'"))
            }
            UploadError::Empty => ApiError::invalid("file: no data"),
            UploadError::InvalidName(name) => {
                ApiError::InvalidRequest(format!("invalid upload name '{name}'"))
            }
            UploadError::TooLarge(max) => ApiError::PayloadTooLarge(max),
            e @ UploadError::Io(_) => ApiError::upstream("upload storage failure", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Upstream { .. } => {
                tracing::error!(error = %self, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        crate::web_server::utils::api_error(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::invalid("id: required").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("project").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StorageError::Corrupt("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upload_errors_map_to_client_or_server() {
        assert_eq!(
            ApiError::from(UploadError::UnsupportedType("text/html".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(UploadError::TooLarge(10)).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(
            ApiError::from(UploadError::Io(io)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_body_does_not_leak_detail() {
        let err = ApiError::upstream(
            "failed to compute statistics",
            StorageError::Corrupt("secret table name".into()),
        );
        assert!(err.to_string().contains("secret table name"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
