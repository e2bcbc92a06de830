//! Storage backend for uploaded course material and notice attachments.
//!
//! Keys are relative, slash-separated paths. Everything belonging to one
//! course lives under `courses/{course_id}/`, so cascading a course deletion is
//! a single [`FileStorage::delete_prefix`] call.
//!
//! ```ignore
//! let storage = LocalFileStorage::new(PathBuf::from("./uploads"), "/files".into());
//! let key = storage.save("courses/c1/f1-notes.pdf", &bytes).await?;
//! let url = storage.get_url(&key)?;
//! storage.delete_prefix("courses/c1").await?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::anyhow;
use axum::http::StatusCode;
use tokio::fs;

use crate::errors::AppError;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

pub trait FileStorage: Send + Sync + fmt::Debug {
    /// Write `content` under `key`, creating parent directories. Returns the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Remove one object. A missing object is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Remove every object under `prefix`. A missing prefix is not an error.
    fn delete_prefix<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, ()>;

    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    TooLarge { max_bytes: usize },
    IoError(std::io::Error),
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    /// HTTP mapping: oversized uploads are 413, bad keys 400, disk errors 500.
    pub fn into_app_error(self) -> AppError {
        match self {
            Self::TooLarge { .. } => AppError::new(StatusCode::PAYLOAD_TOO_LARGE, anyhow!("{}", self)),
            Self::InvalidKey(_) => AppError::bad_request(anyhow!("{}", self)),
            Self::IoError(e) => AppError::internal(e),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Files on the local disk, served by the API under `base_url`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

/// 25MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or be absolute".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::TooLarge {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn delete_prefix<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let prefix = prefix.trim_end_matches('/');
            Self::validate_key(prefix)?;

            match fs::remove_dir_all(self.base_dir.join(prefix)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

/// Reduce a client-supplied file name to characters accepted in a storage key.
///
/// Path components are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`,
/// and leading dots are stripped so the result can never be `..`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').replace("..", "_");

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (LocalFileStorage, PathBuf) {
        let dir = std::env::temp_dir().join(format!("coursehub-storage-{}", uuid::Uuid::new_v4()));
        (
            LocalFileStorage::with_max_size(dir.clone(), "/files".to_string(), 16),
            dir,
        )
    }

    #[test]
    fn test_validate_key() {
        assert!(LocalFileStorage::validate_key("courses/c1/f1-notes.pdf").is_ok());
        assert!(LocalFileStorage::validate_key("notices/n_1/flyer.png").is_ok());
        assert!(LocalFileStorage::validate_key("").is_err());
        assert!(LocalFileStorage::validate_key("../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("courses/c1/a b.pdf").is_err());
    }

    #[test]
    fn test_get_url_trims_trailing_slash() {
        let storage = LocalFileStorage::new(PathBuf::from("./uploads"), "/files/".to_string());
        assert_eq!(
            storage.get_url("courses/c1/f.pdf").unwrap(),
            "/files/courses/c1/f.pdf"
        );
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Lecture 1.pdf"), "Lecture_1.pdf");
        assert_eq!(sanitize_file_name("../../secret.txt"), "secret.txt");
        assert_eq!(sanitize_file_name("C:\\docs\\week2.docx"), "week2.docx");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name("ünï.txt"), "_n_.txt");
    }

    #[test]
    fn test_storage_error_status() {
        let too_large = StorageError::TooLarge { max_bytes: 4 }.into_app_error();
        assert_eq!(too_large.status, StatusCode::PAYLOAD_TOO_LARGE);
        let invalid = StorageError::InvalidKey("x".into()).into_app_error();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_and_delete_prefix() {
        let (storage, dir) = temp_storage();

        storage.save("courses/c1/a.txt", b"alpha").await.unwrap();
        storage.save("courses/c1/b.txt", b"beta").await.unwrap();
        storage.save("courses/c2/c.txt", b"gamma").await.unwrap();

        storage.delete_prefix("courses/c1").await.unwrap();

        assert!(!dir.join("courses/c1").exists());
        assert!(dir.join("courses/c2/c.txt").exists());

        // Second call on a missing prefix is a no-op.
        storage.delete_prefix("courses/c1").await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_content() {
        let (storage, dir) = temp_storage();
        let result = storage.save("courses/c1/big.bin", &[0u8; 17]).await;
        assert!(matches!(result, Err(StorageError::TooLarge { max_bytes: 16 })));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let (storage, dir) = temp_storage();
        storage.delete("courses/none/x.txt").await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }
}
