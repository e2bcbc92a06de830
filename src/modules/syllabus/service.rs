use anyhow::anyhow;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use coursehub_core::AppError;

use super::model::{SyllabusEntry, UpsertSyllabusDto};

const SYLLABUS_COLUMNS: &str = "course_code, title, content, updated_by, updated_at";

fn syllabus_not_found(code: &str) -> AppError {
    AppError::not_found(anyhow!("No syllabus for course {}", code))
}

pub struct SyllabusService;

impl SyllabusService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "syllabus_entries"))]
    pub async fn list_entries(db: &SqlitePool) -> Result<Vec<SyllabusEntry>, AppError> {
        sqlx::query_as::<_, SyllabusEntry>(&format!(
            "SELECT {SYLLABUS_COLUMNS} FROM syllabus_entries ORDER BY course_code"
        ))
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching syllabus entries");
            AppError::from(e)
        })
    }

    pub async fn get_entry(db: &SqlitePool, code: &str) -> Result<SyllabusEntry, AppError> {
        sqlx::query_as::<_, SyllabusEntry>(&format!(
            "SELECT {SYLLABUS_COLUMNS} FROM syllabus_entries WHERE course_code = ?"
        ))
        .bind(code)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| syllabus_not_found(code))
    }

    /// Creates or replaces the syllabus for `code`.
    #[instrument(skip(db, dto), fields(course.code = %code, db.operation = "UPSERT", db.table = "syllabus_entries"))]
    pub async fn upsert_entry(
        db: &SqlitePool,
        code: &str,
        dto: UpsertSyllabusDto,
        updated_by: &str,
    ) -> Result<SyllabusEntry, AppError> {
        let entry = sqlx::query_as::<_, SyllabusEntry>(&format!(
            "INSERT INTO syllabus_entries (course_code, title, content, updated_by, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (course_code) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                updated_by = excluded.updated_by,
                updated_at = excluded.updated_at
             RETURNING {SYLLABUS_COLUMNS}"
        ))
        .bind(code)
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(updated_by)
        .bind(Utc::now())
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error saving syllabus");
            AppError::from(e)
        })?;

        info!(course.code = %code, "Syllabus saved");
        Ok(entry)
    }

    #[instrument(skip(db), fields(course.code = %code, db.operation = "DELETE", db.table = "syllabus_entries"))]
    pub async fn delete_entry(db: &SqlitePool, code: &str) -> Result<SyllabusEntry, AppError> {
        let entry = sqlx::query_as::<_, SyllabusEntry>(&format!(
            "DELETE FROM syllabus_entries WHERE course_code = ? RETURNING {SYLLABUS_COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error deleting syllabus");
            AppError::from(e)
        })?
        .ok_or_else(|| syllabus_not_found(code))?;

        info!(course.code = %code, "Syllabus deleted");
        Ok(entry)
    }
}
