use anyhow::anyhow;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, instrument, warn};

use coursehub_core::ids::time_based_id;
use coursehub_core::{AppError, FileStorage, sanitize_file_name};

use super::model::CourseFile;
use crate::modules::courses::service::CourseService;

const FILE_COLUMNS: &str =
    "id, course_id, name, storage_key, size_bytes, uploaded_by, uploaded_at";

pub struct CourseFileService;

impl CourseFileService {
    fn with_url(storage: &dyn FileStorage, mut file: CourseFile) -> Result<CourseFile, AppError> {
        file.url = storage
            .get_url(&file.storage_key)
            .map_err(|e| e.into_app_error())?;
        Ok(file)
    }

    #[instrument(skip(db, storage), fields(course.id = %course_id, db.operation = "SELECT", db.table = "course_files"))]
    pub async fn list_files(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        course_id: &str,
    ) -> Result<Vec<CourseFile>, AppError> {
        CourseService::get_course(db, course_id).await?;

        let files = sqlx::query_as::<_, CourseFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM course_files WHERE course_id = ? ORDER BY uploaded_at DESC"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(course.id = %course_id, error = %e, "Database error fetching course files");
            AppError::from(e)
        })?;

        files
            .into_iter()
            .map(|file| Self::with_url(storage, file))
            .collect()
    }

    pub async fn get_file(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        course_id: &str,
        file_id: &str,
    ) -> Result<CourseFile, AppError> {
        let file = sqlx::query_as::<_, CourseFile>(&format!(
            "SELECT {FILE_COLUMNS} FROM course_files WHERE id = ? AND course_id = ?"
        ))
        .bind(file_id)
        .bind(course_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            AppError::not_found(anyhow!("File {} not found in course {}", file_id, course_id))
        })?;

        Self::with_url(storage, file)
    }

    /// Stores `content` and records it against the course. The stored object is
    /// removed again if the row cannot be written.
    #[instrument(skip(db, storage, content), fields(course.id = %course_id, file.size = content.len(), db.operation = "INSERT", db.table = "course_files"))]
    pub async fn upload_file(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        course_id: &str,
        name: &str,
        content: &[u8],
        uploaded_by: &str,
    ) -> Result<CourseFile, AppError> {
        if content.is_empty() {
            return Err(AppError::bad_request(anyhow!("Uploaded file is empty")));
        }
        CourseService::get_course(db, course_id).await?;

        let id = time_based_id();
        let file_name = sanitize_file_name(name);
        let key = format!("courses/{}/{}-{}", course_id, id, file_name);

        storage
            .save(&key, content)
            .await
            .map_err(|e| e.into_app_error())?;

        let inserted = sqlx::query_as::<_, CourseFile>(&format!(
            "INSERT INTO course_files (id, course_id, name, storage_key, size_bytes, uploaded_by, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {FILE_COLUMNS}"
        ))
        .bind(&id)
        .bind(course_id)
        .bind(&file_name)
        .bind(&key)
        .bind(content.len() as i64)
        .bind(uploaded_by)
        .bind(Utc::now())
        .fetch_one(db)
        .await;

        let file = match inserted {
            Ok(file) => file,
            Err(e) => {
                error!(course.id = %course_id, error = %e, "Database error recording upload");
                if let Err(cleanup) = storage.delete(&key).await {
                    warn!(storage.key = %key, error = %cleanup, "Failed to remove orphaned upload");
                }
                return Err(AppError::from(e));
            }
        };

        info!(file.id = %file.id, storage.key = %key, "Course file uploaded");
        Self::with_url(storage, file)
    }

    /// Deletes the row, then the stored object. Object removal failures are
    /// logged only.
    #[instrument(skip(db, storage), fields(course.id = %course_id, file.id = %file_id, db.operation = "DELETE", db.table = "course_files"))]
    pub async fn delete_file(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        course_id: &str,
        file_id: &str,
    ) -> Result<CourseFile, AppError> {
        let file = sqlx::query_as::<_, CourseFile>(&format!(
            "DELETE FROM course_files WHERE id = ? AND course_id = ? RETURNING {FILE_COLUMNS}"
        ))
        .bind(file_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error deleting course file");
            AppError::from(e)
        })?
        .ok_or_else(|| {
            AppError::not_found(anyhow!("File {} not found in course {}", file_id, course_id))
        })?;

        if let Err(e) = storage.delete(&file.storage_key).await {
            warn!(storage.key = %file.storage_key, error = %e, "Failed to remove stored file");
        }

        info!(file.id = %file_id, "Course file deleted");
        Ok(file)
    }
}
