//! Typed request bodies that validate before a handler runs.
//!
//! A body type implements [`RequestSchema`]: serde handles the shape, and
//! `validate` checks field contents and produces the value the handler
//! actually works with. [`ValidJson`] wires both into an extractor whose
//! rejection is [`ApiError::InvalidRequest`].

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub trait RequestSchema: DeserializeOwned + Send + 'static {
    type Valid: Send;

    fn validate(self) -> Result<Self::Valid, ApiError>;
}

/// Extracts a JSON body of type `T` and yields `T::Valid`.
pub struct ValidJson<T: RequestSchema>(pub T::Valid);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: RequestSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
        body.validate().map(ValidJson)
    }
}

const MAX_FIELD_LEN: usize = 10_000;

/// Trimmed, non-empty, bounded.
pub fn required(field: &str, value: String) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidRequest(format!("{field}: required")));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(ApiError::InvalidRequest(format!("{field}: too long")));
    }
    Ok(value.to_string())
}

/// Trimmed; blank becomes `None`.
pub fn optional(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.len() > MAX_FIELD_LEN => {
            Err(ApiError::InvalidRequest(format!("{field}: too long")))
        }
        Some(v) => Ok(Some(v.to_string())),
    }
}

pub fn email(field: &str, value: String) -> Result<String, ApiError> {
    let value = required(field, value)?;
    let well_formed = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.')
            && !value.chars().any(char::is_whitespace)
    });
    if well_formed {
        Ok(value)
    } else {
        Err(ApiError::InvalidRequest(format!(
            "{field}: not a valid email address"
        )))
    }
}

/// An absolute http(s) URL or a path to one of our uploads.
pub fn link(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(value) = optional(field, value)? else {
        return Ok(None);
    };
    if value.starts_with("https://")
        || value.starts_with("http://")
        || value.starts_with(crate::uploads::PUBLIC_PREFIX)
    {
        Ok(Some(value))
    } else {
        Err(ApiError::InvalidRequest(format!(
            "{field}: must be an http(s) URL or an uploaded file path"
        )))
    }
}

/// `YYYY-MM-DD`.
pub fn date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    optional(field, value)?
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| {
                ApiError::InvalidRequest(format!("{field}: expected a YYYY-MM-DD date"))
            })
        })
        .transpose()
}

pub fn proficiency(field: &str, value: i64) -> Result<u8, ApiError> {
    if (1..=100).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ApiError::InvalidRequest(format!(
            "{field}: must be between 1 and 100"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_optional() {
        assert_eq!(required("title", "  Folio ".into()).unwrap(), "Folio");
        let err = required("title", "   ".into()).unwrap_err();
        assert_eq!(err.to_string(), "title: required");
        assert_eq!(optional("phone", Some(" ".into())).unwrap(), None);
        assert_eq!(optional("phone", None).unwrap(), None);
        assert!(required("title", "x".repeat(MAX_FIELD_LEN + 1)).is_err());
    }

    #[test]
    fn test_email() {
        assert!(email("email", "ada@example.com".into()).is_ok());
        for bad in ["", "ada", "ada@", "@example.com", "ada@example", "a da@example.com", "ada@.com"] {
            assert!(email("email", bad.into()).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_link() {
        assert!(link("repoUrl", Some("https://github.com/x".into())).is_ok());
        assert!(link("image", Some("/uploads/1-a.png".into())).is_ok());
        assert_eq!(link("image", Some("".into())).unwrap(), None);
        assert!(link("repoUrl", Some("javascript:alert(1)".into())).is_err());
    }

    #[test]
    fn test_date_and_proficiency() {
        assert_eq!(
            date("startDate", Some("2023-02-01".into())).unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 1)
        );
        assert!(date("startDate", Some("02/01/2023".into())).is_err());
        assert_eq!(proficiency("proficiency", 1).unwrap(), 1);
        assert_eq!(proficiency("proficiency", 100).unwrap(), 100);
        assert!(proficiency("proficiency", 0).is_err());
        assert!(proficiency("proficiency", 101).is_err());
    }
}
