use anyhow::anyhow;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, instrument, warn};

use coursehub_core::ids::time_based_id;
use coursehub_core::{AppError, FileStorage, sanitize_file_name};

use super::model::{CreateNoticeDto, Notice, UpdateNoticeDto};

const NOTICE_COLUMNS: &str =
    "id, title, body, document_key, document_name, created_by, created_at, updated_at";

fn notice_not_found(id: &str) -> AppError {
    AppError::not_found(anyhow!("Notice {} not found", id))
}

pub struct NoticeService;

impl NoticeService {
    fn with_url(storage: &dyn FileStorage, mut notice: Notice) -> Result<Notice, AppError> {
        notice.document_url = notice
            .document_key
            .as_deref()
            .map(|key| storage.get_url(key))
            .transpose()
            .map_err(|e| e.into_app_error())?;
        Ok(notice)
    }

    #[instrument(skip(db, storage), fields(db.operation = "SELECT", db.table = "notices"))]
    pub async fn list_notices(
        db: &SqlitePool,
        storage: &dyn FileStorage,
    ) -> Result<Vec<Notice>, AppError> {
        let notices = sqlx::query_as::<_, Notice>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching notices");
            AppError::from(e)
        })?;

        notices
            .into_iter()
            .map(|notice| Self::with_url(storage, notice))
            .collect()
    }

    pub async fn get_notice(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        id: &str,
    ) -> Result<Notice, AppError> {
        let notice = sqlx::query_as::<_, Notice>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| notice_not_found(id))?;

        Self::with_url(storage, notice)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "notices"))]
    pub async fn create_notice(
        db: &SqlitePool,
        dto: CreateNoticeDto,
        created_by: &str,
    ) -> Result<Notice, AppError> {
        let now = Utc::now();
        let notice = sqlx::query_as::<_, Notice>(&format!(
            "INSERT INTO notices (id, title, body, created_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(time_based_id())
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating notice");
            AppError::from(e)
        })?;

        info!(notice.id = %notice.id, "Notice created");
        Ok(notice)
    }

    #[instrument(skip(db, storage, dto), fields(notice.id = %id, db.operation = "UPDATE", db.table = "notices"))]
    pub async fn update_notice(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        id: &str,
        dto: UpdateNoticeDto,
    ) -> Result<Notice, AppError> {
        let notice = sqlx::query_as::<_, Notice>(&format!(
            "UPDATE notices SET
                title = COALESCE(?, title),
                body = COALESCE(?, body),
                updated_at = ?
             WHERE id = ?
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating notice");
            AppError::from(e)
        })?
        .ok_or_else(|| notice_not_found(id))?;

        Self::with_url(storage, notice)
    }

    /// Stores a document under `notices/{id}/` and links it to the notice,
    /// replacing (and removing) any previous document.
    #[instrument(skip(db, storage, content), fields(notice.id = %id, file.size = content.len(), db.operation = "UPDATE", db.table = "notices"))]
    pub async fn attach_document(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<Notice, AppError> {
        if content.is_empty() {
            return Err(AppError::bad_request(anyhow!("Uploaded document is empty")));
        }
        let previous = Self::get_notice(db, storage, id).await?;

        let file_name = sanitize_file_name(name);
        let key = format!("notices/{}/{}", id, file_name);
        storage
            .save(&key, content)
            .await
            .map_err(|e| e.into_app_error())?;

        let notice = sqlx::query_as::<_, Notice>(&format!(
            "UPDATE notices SET document_key = ?, document_name = ?, updated_at = ?
             WHERE id = ?
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(&key)
        .bind(&file_name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| notice_not_found(id))?;

        if let Some(old_key) = previous.document_key.filter(|old| *old != key) {
            if let Err(e) = storage.delete(&old_key).await {
                warn!(storage.key = %old_key, error = %e, "Failed to remove replaced notice document");
            }
        }

        info!(notice.id = %id, storage.key = %key, "Notice document attached");
        Self::with_url(storage, notice)
    }

    /// Deletes the notice, then its document. Document removal failures are
    /// logged only.
    #[instrument(skip(db, storage), fields(notice.id = %id, db.operation = "DELETE", db.table = "notices"))]
    pub async fn delete_notice(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        id: &str,
    ) -> Result<Notice, AppError> {
        let notice = sqlx::query_as::<_, Notice>(&format!(
            "DELETE FROM notices WHERE id = ? RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error deleting notice");
            AppError::from(e)
        })?
        .ok_or_else(|| notice_not_found(id))?;

        if notice.document_key.is_some() {
            if let Err(e) = storage.delete_prefix(&format!("notices/{}", id)).await {
                warn!(notice.id = %id, error = %e, "Failed to remove notice document");
            }
        }

        info!(notice.id = %id, "Notice deleted");
        Ok(notice)
    }
}
