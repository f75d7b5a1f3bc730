//! Admin authentication: password hashing, login sessions and credential
//! changes.
//!
//! Storage calls are short and synchronous. Password hashing and
//! verification run on the blocking pool with the storage lock released.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::{AdminUserRow, SessionRow, Storage, StorageError};

pub const SESSION_COOKIE: &str = "folio_session";
pub const MIN_PASSWORD_LEN: usize = 8;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// An authenticated admin, resolved from a live session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub token: String,
}

pub fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest under which a session token is stored.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Argon2id with default parameters, encoded as a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(AuthError::Hash)
}

pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

async fn verify_blocking(password: String, phc: String) -> Result<bool, AuthError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &phc)).await?)
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// Token from an `Authorization: Bearer` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve a token to a live session. Expired or unknown tokens, and tokens
/// whose user no longer exists, resolve to `None`.
pub fn resolve_session(
    storage: &Storage,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<Session>, StorageError> {
    let Some(row) = storage.get_session(&token_digest(token))? else {
        return Ok(None);
    };
    if row.expires_at <= now {
        return Ok(None);
    }
    let Some(user) = storage.get_admin_by_id(&row.user_id)? else {
        return Ok(None);
    };
    Ok(Some(Session {
        user_id: user.id,
        username: user.username,
        expires_at: row.expires_at,
        token: token.to_string(),
    }))
}

/// Check credentials and open a new session. Returns `None` on a bad
/// username or password without saying which.
pub async fn login(
    storage: &Mutex<Storage>,
    username: &str,
    password: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Option<Session>, AuthError> {
    let user = {
        let storage = storage.lock().await;
        storage.purge_expired_sessions(now)?;
        storage.get_admin_by_username(username)?
    };
    let Some(user) = user else {
        return Ok(None);
    };
    if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
        return Ok(None);
    }

    let token = new_token();
    let row = SessionRow {
        token_hash: token_digest(&token),
        user_id: user.id.clone(),
        created_at: now,
        expires_at: now + ttl,
    };
    storage.lock().await.insert_session(&row)?;

    Ok(Some(Session {
        user_id: user.id,
        username: user.username,
        expires_at: row.expires_at,
        token,
    }))
}

pub fn logout(storage: &Storage, session: &Session) -> Result<bool, StorageError> {
    storage.delete_session(&token_digest(&session.token))
}

/// Create the first admin account if none exists. Returns whether an
/// account was created.
pub fn bootstrap_admin(
    storage: &Storage,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<bool, AuthError> {
    if storage.count_admin_users()? > 0 {
        return Ok(false);
    }
    storage.insert_admin_user(&AdminUserRow {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        created_at: now,
        updated_at: now,
    })?;
    Ok(true)
}

/// Requested credential change, already validated for shape.
#[derive(Debug, Clone)]
pub struct CredentialChange {
    pub current_password: String,
    pub new_username: Option<String>,
    pub new_password: Option<String>,
}

/// Apply a credential change for the session's user. The current password
/// must match. Other sessions of the user are revoked; the calling session
/// survives.
pub async fn change_credentials(
    storage: &Mutex<Storage>,
    session: &Session,
    change: &CredentialChange,
    now: DateTime<Utc>,
) -> Result<AdminUserRow, ApiError> {
    let user = storage
        .lock()
        .await
        .get_admin_by_id(&session.user_id)?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_blocking(change.current_password.clone(), user.password_hash.clone()).await? {
        return Err(ApiError::invalid("currentPassword: does not match"));
    }

    let password_hash = match &change.new_password {
        Some(password) => hash_blocking(password.clone()).await?,
        None => user.password_hash.clone(),
    };

    let storage = storage.lock().await;
    if let Some(name) = &change.new_username {
        if *name != user.username && storage.get_admin_by_username(name)?.is_some() {
            return Err(ApiError::invalid("newUsername: already taken"));
        }
    }

    let updated = AdminUserRow {
        username: change
            .new_username
            .clone()
            .unwrap_or_else(|| user.username.clone()),
        password_hash,
        updated_at: now,
        ..user
    };
    storage.update_admin_credentials(&updated)?;
    storage.delete_other_sessions(&updated.id, &token_digest(&session.token))?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::storage::tests::test_storage;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert_ne!(hash, hash_password("correct horse").unwrap());
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer  "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_login_resolve_logout() {
        let storage = Mutex::new(test_storage());
        {
            let s = storage.lock().await;
            assert!(bootstrap_admin(&s, "admin", "s3cret-pass", now()).unwrap());
            assert!(!bootstrap_admin(&s, "other", "whatever1", now()).unwrap());
        }

        assert!(login(&storage, "admin", "nope", Duration::hours(1), now())
            .await
            .unwrap()
            .is_none());
        assert!(login(&storage, "ghost", "s3cret-pass", Duration::hours(1), now())
            .await
            .unwrap()
            .is_none());

        let session = login(&storage, "admin", "s3cret-pass", Duration::hours(1), now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.username, "admin");

        let s = storage.lock().await;
        // The raw token is never what the table holds
        assert!(s.get_session(&session.token).unwrap().is_none());
        assert!(s.get_session(&token_digest(&session.token)).unwrap().is_some());

        let resolved = resolve_session(&s, &session.token, now()).unwrap();
        assert_eq!(resolved.as_ref(), Some(&session));

        // Expiry is exclusive
        let later = now() + Duration::hours(1);
        assert!(resolve_session(&s, &session.token, later).unwrap().is_none());

        assert!(logout(&s, &session).unwrap());
        assert!(resolve_session(&s, &session.token, now()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_interleaves_with_other_storage_users() {
        let storage = std::sync::Arc::new(Mutex::new(test_storage()));
        bootstrap_admin(&*storage.lock().await, "admin", "s3cret-pass", now()).unwrap();

        let pending = {
            let storage = std::sync::Arc::clone(&storage);
            tokio::spawn(async move {
                login(&storage, "admin", "s3cret-pass", Duration::hours(1), now()).await
            })
        };
        // Other requests can take the lock while the login is in flight
        for _ in 0..10 {
            let s = storage.lock().await;
            s.count_admin_users().unwrap();
            drop(s);
            tokio::task::yield_now().await;
        }
        assert!(pending.await.unwrap().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_change_credentials() {
        let storage = Mutex::new(test_storage());
        bootstrap_admin(&*storage.lock().await, "admin", "first-pass", now()).unwrap();
        let session = login(&storage, "admin", "first-pass", Duration::hours(1), now())
            .await
            .unwrap()
            .unwrap();
        let other = login(&storage, "admin", "first-pass", Duration::hours(1), now())
            .await
            .unwrap()
            .unwrap();

        let wrong = CredentialChange {
            current_password: "bad-pass".to_string(),
            new_username: None,
            new_password: Some("second-pass".to_string()),
        };
        assert!(matches!(
            change_credentials(&storage, &session, &wrong, now()).await,
            Err(ApiError::InvalidRequest(_))
        ));

        let change = CredentialChange {
            current_password: "first-pass".to_string(),
            new_username: Some("owner".to_string()),
            new_password: Some("second-pass".to_string()),
        };
        let updated = change_credentials(&storage, &session, &change, now())
            .await
            .unwrap();
        assert_eq!(updated.username, "owner");
        assert!(updated.password_hash.starts_with("$argon2id$"));

        assert!(login(&storage, "admin", "first-pass", Duration::hours(1), now())
            .await
            .unwrap()
            .is_none());

        // The calling session survives, the other one is revoked
        {
            let s = storage.lock().await;
            assert!(resolve_session(&s, &session.token, now()).unwrap().is_some());
            assert!(resolve_session(&s, &other.token, now()).unwrap().is_none());
        }

        assert!(login(&storage, "owner", "second-pass", Duration::hours(1), now())
            .await
            .unwrap()
            .is_some());
    }
}
