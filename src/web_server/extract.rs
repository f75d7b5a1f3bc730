//! Session extractors.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::auth::{self, Session, SESSION_COOKIE};
use crate::error::ApiError;
use crate::web_server::state::SharedState;

/// Session token from the `folio_session` cookie, else a Bearer header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| auth::bearer_token(headers))
}

/// The caller's session if the request carries a live token.
pub struct MaybeSession(pub Option<Session>);

/// Rejects with 401 unless the request carries a live token.
pub struct AdminSession(pub Session);

#[async_trait]
impl FromRequestParts<SharedState> for MaybeSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(MaybeSession(None));
        };
        let storage = state.storage.lock().await;
        let session = auth::resolve_session(&storage, &token, Utc::now())?;
        Ok(MaybeSession(session))
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
        session.map(AdminSession).ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderValue};

    use super::*;

    #[test]
    fn test_session_token_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; folio_session=fromcookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("fromcookie"));

        // An empty cookie falls through to the header
        headers.insert(header::COOKIE, HeaderValue::from_static("folio_session="));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        let mut cookie_only = HeaderMap::new();
        cookie_only.insert(header::COOKIE, HeaderValue::from_static("folio_session="));
        assert_eq!(session_token(&cookie_only), None);
    }
}
