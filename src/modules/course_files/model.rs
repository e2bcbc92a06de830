use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Course material stored under `courses/{course_id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseFile {
    pub id: String,
    pub course_id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub size_bytes: i64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    /// Public download URL, filled in from the storage backend.
    #[sqlx(skip)]
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Original file name; sanitized before it becomes part of the storage key.
    pub name: String,
}
