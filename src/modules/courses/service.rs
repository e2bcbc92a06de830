use anyhow::anyhow;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument, warn};

use coursehub_core::ids::slugify;
use coursehub_core::{AppError, FileStorage};

use super::model::{Course, CreateCourseDto, UpdateCourseDto};

const COURSE_COLUMNS: &str =
    "id, code, title, credits, semester, description, created_at, updated_at";

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "courses"))]
    pub async fn list_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
        sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY code"))
            .fetch_all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error fetching courses");
                AppError::from(e)
            })
    }

    pub async fn get_course(db: &SqlitePool, id: &str) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(|e| {
                error!(course.id = %id, error = %e, "Database error fetching course");
                AppError::from(e)
            })?
            .ok_or_else(|| AppError::not_found(anyhow!("Course {} not found", id)))
    }

    #[instrument(skip(db, dto), fields(course.code = %dto.code, db.operation = "INSERT", db.table = "courses"))]
    pub async fn create_course(db: &SqlitePool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let id = slugify(&dto.code);
        if id.is_empty() {
            return Err(AppError::bad_request(anyhow!(
                "Course code must contain letters or digits"
            )));
        }

        let now = Utc::now();
        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (id, code, title, credits, semester, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&id)
        .bind(dto.code.trim())
        .bind(&dto.title)
        .bind(dto.credits)
        .bind(&dto.semester)
        .bind(&dto.description)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                warn!(course.id = %id, "Course already exists");
                AppError::bad_request(anyhow!("Course {} already exists", dto.code.trim()))
            }
            e => {
                error!(error = %e, "Database error creating course");
                AppError::from(e)
            }
        })?;

        info!(course.id = %course.id, "Course created");
        Ok(course)
    }

    #[instrument(skip(db, dto), fields(course.id = %id, db.operation = "UPDATE", db.table = "courses"))]
    pub async fn update_course(
        db: &SqlitePool,
        id: &str,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses SET
                title = COALESCE(?, title),
                credits = COALESCE(?, credits),
                semester = COALESCE(?, semester),
                description = COALESCE(?, description),
                updated_at = ?
             WHERE id = ?
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(dto.credits)
        .bind(&dto.semester)
        .bind(&dto.description)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(course.id = %id, error = %e, "Database error updating course");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow!("Course {} not found", id)))
    }

    /// Removes the course with its files and exams, then every stored object
    /// under `courses/{id}`. Object cleanup failures are logged only.
    #[instrument(skip(db, storage), fields(course.id = %id, db.operation = "DELETE", db.table = "courses"))]
    pub async fn delete_course(
        db: &SqlitePool,
        storage: &dyn FileStorage,
        id: &str,
    ) -> Result<Course, AppError> {
        let mut tx = db.begin().await?;

        let files = sqlx::query("DELETE FROM course_files WHERE course_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let exams = sqlx::query("DELETE FROM exams WHERE course_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "DELETE FROM courses WHERE id = ? RETURNING {COURSE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!(course.id = %id, error = %e, "Database error deleting course");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow!("Course {} not found", id)))?;

        tx.commit().await?;

        debug!(
            files = files.rows_affected(),
            exams = exams.rows_affected(),
            "Removed course dependents"
        );

        if let Err(e) = storage.delete_prefix(&format!("courses/{}", id)).await {
            warn!(course.id = %id, error = %e, "Failed to remove stored course files");
        }

        info!(course.id = %id, "Course deleted");
        Ok(course)
    }
}
