//! Upload storage configuration.
//!
//! - `UPLOAD_DIR`: directory holding course materials and notice documents (default `./uploads`)
//! - `FILES_BASE_URL`: public URL prefix the API serves uploads under (default `/files`)
//! - `MAX_UPLOAD_BYTES`: largest accepted upload (default 25MB)

use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub files_base_url: String,
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./uploads"),
            files_base_url: "/files".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            files_base_url: env::var("FILES_BASE_URL").unwrap_or(defaults.files_base_url),
            max_upload_bytes: crate::env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }
}
