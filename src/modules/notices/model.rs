use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Notice board post with an optional attached document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing)]
    pub document_key: Option<String>,
    pub document_name: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub document_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNoticeDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateNoticeDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DocumentQuery {
    /// Original document name.
    pub name: String,
}
