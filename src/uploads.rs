//! Image uploads stored as plain files under a single directory and served
//! back under `/uploads/<name>`.

use std::io;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Maximum accepted upload size (5 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// URL prefix under which stored uploads are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported content type '{0}'")]
    UnsupportedType(String),

    #[error("upload is empty")]
    Empty,

    #[error("invalid upload name '{0}'")]
    InvalidName(String),

    #[error("upload exceeds {0} bytes")]
    TooLarge(u64),

    #[error("upload io: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    pub name: String,
    pub path: String,
    pub content_type: String,
    pub size: u64,
}

/// Map an accepted image content type to its file extension.
fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Accept a bare stored name or a public path, return the bare name.
/// Anything that could escape the upload directory is rejected.
pub fn name_from_public_path(path_or_name: &str) -> Result<&str, UploadError> {
    let name = path_or_name
        .strip_prefix(PUBLIC_PREFIX)
        .unwrap_or(path_or_name);
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(name)
    } else {
        Err(UploadError::InvalidName(path_or_name.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Use `root` as the upload directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub async fn save(&self, content_type: &str, data: &[u8]) -> Result<StoredUpload, UploadError> {
        let ext = image_extension(content_type)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))?;
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        if data.len() as u64 > MAX_UPLOAD_SIZE {
            return Err(UploadError::TooLarge(MAX_UPLOAD_SIZE));
        }

        let name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            ext
        );
        tokio::fs::write(self.root.join(&name), data).await?;

        Ok(StoredUpload {
            path: format!("{PUBLIC_PREFIX}{name}"),
            name,
            content_type: mime_guess::from_ext(ext)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            size: data.len() as u64,
        })
    }

    /// Read a stored file and its guessed content type. `None` when absent.
    pub async fn read(&self, name: &str) -> Result<Option<(Vec<u8>, String)>, UploadError> {
        let name = name_from_public_path(name)?;
        match tokio::fs::read(self.root.join(name)).await {
            Ok(data) => {
                let mime = mime_guess::from_path(name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string();
                Ok(Some((data, mime)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete by bare name or public path. Returns whether a file was removed.
    pub async fn delete(&self, path_or_name: &str) -> Result<bool, UploadError> {
        let name = name_from_public_path(path_or_name)?;
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_name_validation() {
        assert_eq!(
            name_from_public_path("/uploads/1700-abc.png").unwrap(),
            "1700-abc.png"
        );
        assert_eq!(name_from_public_path("1700-abc.png").unwrap(), "1700-abc.png");
        for bad in ["", "/uploads/", "../etc/passwd", "a/b.png", ".hidden", "x..png", "a\\b"] {
            assert!(
                matches!(name_from_public_path(bad), Err(UploadError::InvalidName(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("IMAGE/JPEG; charset=binary"), Some("jpg"));
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(image_extension("text/html"), None);
    }

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).unwrap();

        let stored = store.save("image/png", PNG).await.unwrap();
        assert!(stored.path.starts_with(PUBLIC_PREFIX));
        assert!(stored.name.ends_with(".png"));
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.size, PNG.len() as u64);

        let (data, mime) = store.read(&stored.name).await.unwrap().unwrap();
        assert_eq!(data, PNG);
        assert_eq!(mime, "image/png");

        assert!(store.delete(&stored.path).await.unwrap());
        assert!(!store.delete(&stored.path).await.unwrap());
        assert!(store.read(&stored.name).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.save("text/plain", b"hi").await,
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.save("image/gif", b"").await,
            Err(UploadError::Empty)
        ));
        let big = vec![0u8; MAX_UPLOAD_SIZE as usize + 1];
        assert!(matches!(
            store.save("image/webp", &big).await,
            Err(UploadError::TooLarge(MAX_UPLOAD_SIZE))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
