use anyhow::anyhow;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use coursehub_core::AppError;
use coursehub_core::ids::time_based_id;

use super::model::{CreateExamDto, Exam, UpdateExamDto};
use crate::modules::courses::service::CourseService;

const EXAM_COLUMNS: &str =
    "id, course_id, title, exam_date, start_time, room, notes, created_at, updated_at";

fn exam_not_found(course_id: &str, exam_id: &str) -> AppError {
    AppError::not_found(anyhow!("Exam {} not found in course {}", exam_id, course_id))
}

pub struct ExamService;

impl ExamService {
    /// Every exam across courses, soonest first.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "exams"))]
    pub async fn list_exams(db: &SqlitePool) -> Result<Vec<Exam>, AppError> {
        sqlx::query_as::<_, Exam>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams ORDER BY exam_date, start_time"
        ))
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching exams");
            AppError::from(e)
        })
    }

    pub async fn list_course_exams(db: &SqlitePool, course_id: &str) -> Result<Vec<Exam>, AppError> {
        CourseService::get_course(db, course_id).await?;

        sqlx::query_as::<_, Exam>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE course_id = ? ORDER BY exam_date, start_time"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await
        .map_err(AppError::from)
    }

    pub async fn get_exam(db: &SqlitePool, course_id: &str, exam_id: &str) -> Result<Exam, AppError> {
        sqlx::query_as::<_, Exam>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE id = ? AND course_id = ?"
        ))
        .bind(exam_id)
        .bind(course_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| exam_not_found(course_id, exam_id))
    }

    #[instrument(skip(db, dto), fields(course.id = %course_id, db.operation = "INSERT", db.table = "exams"))]
    pub async fn create_exam(
        db: &SqlitePool,
        course_id: &str,
        dto: CreateExamDto,
    ) -> Result<Exam, AppError> {
        CourseService::get_course(db, course_id).await?;

        let now = Utc::now();
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "INSERT INTO exams (id, course_id, title, exam_date, start_time, room, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(time_based_id())
        .bind(course_id)
        .bind(&dto.title)
        .bind(dto.exam_date)
        .bind(dto.start_time)
        .bind(&dto.room)
        .bind(&dto.notes)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating exam");
            AppError::from(e)
        })?;

        info!(exam.id = %exam.id, "Exam created");
        Ok(exam)
    }

    #[instrument(skip(db, dto), fields(course.id = %course_id, exam.id = %exam_id, db.operation = "UPDATE", db.table = "exams"))]
    pub async fn update_exam(
        db: &SqlitePool,
        course_id: &str,
        exam_id: &str,
        dto: UpdateExamDto,
    ) -> Result<Exam, AppError> {
        sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams SET
                title = COALESCE(?, title),
                exam_date = COALESCE(?, exam_date),
                start_time = COALESCE(?, start_time),
                room = COALESCE(?, room),
                notes = COALESCE(?, notes),
                updated_at = ?
             WHERE id = ? AND course_id = ?
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(dto.exam_date)
        .bind(dto.start_time)
        .bind(&dto.room)
        .bind(&dto.notes)
        .bind(Utc::now())
        .bind(exam_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating exam");
            AppError::from(e)
        })?
        .ok_or_else(|| exam_not_found(course_id, exam_id))
    }

    #[instrument(skip(db), fields(course.id = %course_id, exam.id = %exam_id, db.operation = "DELETE", db.table = "exams"))]
    pub async fn delete_exam(db: &SqlitePool, course_id: &str, exam_id: &str) -> Result<Exam, AppError> {
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "DELETE FROM exams WHERE id = ? AND course_id = ? RETURNING {EXAM_COLUMNS}"
        ))
        .bind(exam_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error deleting exam");
            AppError::from(e)
        })?
        .ok_or_else(|| exam_not_found(course_id, exam_id))?;

        info!(exam.id = %exam_id, "Exam deleted");
        Ok(exam)
    }
}
