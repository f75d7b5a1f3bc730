//! Admin login, logout, session lookup and credential changes.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::auth::{self, CredentialChange, MIN_PASSWORD_LEN, SESSION_COOKIE};
use crate::error::ApiError;
use crate::logging::short_id;
use crate::web_server::extract::{AdminSession, MaybeSession};
use crate::web_server::state::SharedState;
use crate::web_server::utils::{now_secs, success};
use crate::web_server::validation::{optional, required, RequestSchema, ValidJson};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

impl RequestSchema for LoginRequest {
    type Valid = LoginRequest;

    fn validate(self) -> Result<LoginRequest, ApiError> {
        if self.password.is_empty() {
            return Err(ApiError::invalid("password: required"));
        }
        Ok(LoginRequest {
            username: required("username", self.username)?,
            password: self.password,
        })
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub async fn login_handler(
    State(state): State<SharedState>,
    jar: CookieJar,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = auth::login(
        &state.storage,
        &req.username,
        &req.password,
        state.settings.session_ttl,
        now_secs(),
    )
    .await?
    .ok_or_else(|| {
        tracing::warn!(username = %req.username, "failed login attempt");
        ApiError::Unauthorized
    })?;

    tracing::info!(user = short_id(&session.user_id), "admin logged in");
    let body = serde_json::json!({ "user": &session, "token": &session.token });
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((jar, Json(body)).into_response())
}

pub async fn logout_handler(
    State(state): State<SharedState>,
    AdminSession(session): AdminSession,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    {
        let storage = state.storage.lock().await;
        auth::logout(&storage, &session)?;
    }
    tracing::info!(user = short_id(&session.user_id), "admin logged out");
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, success()).into_response())
}

pub async fn session_handler(MaybeSession(session): MaybeSession) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": session }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    current_password: String,
    new_username: Option<String>,
    new_password: Option<String>,
}

impl RequestSchema for CredentialsRequest {
    type Valid = CredentialChange;

    fn validate(self) -> Result<CredentialChange, ApiError> {
        if self.current_password.is_empty() {
            return Err(ApiError::invalid("currentPassword: required"));
        }
        let new_username = optional("newUsername", self.new_username)?;
        let new_password = self.new_password.filter(|p| !p.is_empty());
        if let Some(p) = &new_password {
            if p.chars().count() < MIN_PASSWORD_LEN {
                return Err(ApiError::InvalidRequest(format!(
                    "newPassword: at least {MIN_PASSWORD_LEN} characters"
                )));
            }
        }
        if new_username.is_none() && new_password.is_none() {
            return Err(ApiError::invalid(
                "newUsername or newPassword: at least one is required",
            ));
        }
        Ok(CredentialChange {
            current_password: self.current_password,
            new_username,
            new_password,
        })
    }
}

/// Apply the change, then notify the admin address. The change is committed
/// before the mail goes out; a mail failure still reports an error.
pub async fn update_credentials_handler(
    State(state): State<SharedState>,
    AdminSession(session): AdminSession,
    ValidJson(change): ValidJson<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let now = now_secs();
    let updated = auth::change_credentials(&state.storage, &session, &change, now).await?;
    tracing::info!(user = short_id(&updated.id), "admin credentials changed");

    match &state.notifier {
        Some(notifier) => notifier
            .credentials_changed(&updated.username, now)
            .await
            .map_err(|e| ApiError::upstream("failed to send credentials notification", e))?,
        None => tracing::info!("mail not configured, skipping credentials notification"),
    }

    let body = serde_json::json!({
        "user": {
            "userId": updated.id,
            "username": updated.username,
            "expiresAt": session.expires_at,
        }
    });
    Ok(Json(body).into_response())
}
