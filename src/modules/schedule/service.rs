use anyhow::anyhow;
use chrono::{NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use coursehub_core::AppError;
use coursehub_core::ids::time_based_id;

use super::model::{CreateScheduleEntryDto, ScheduleEntry, SetCancellationDto, UpdateScheduleEntryDto};

const SCHEDULE_COLUMNS: &str = "id, course_code, day_of_week, start_time, end_time, room, \
     instructor, is_cancelled, cancellation_note, updated_at";

fn entry_not_found(id: &str) -> AppError {
    AppError::not_found(anyhow!("Schedule entry {} not found", id))
}

fn check_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::bad_request(anyhow!("end_time must be after start_time")));
    }
    Ok(())
}

pub struct ScheduleService;

impl ScheduleService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "schedule_entries"))]
    pub async fn list_entries(db: &SqlitePool) -> Result<Vec<ScheduleEntry>, AppError> {
        sqlx::query_as::<_, ScheduleEntry>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedule_entries
             ORDER BY CASE day_of_week
                WHEN 'monday' THEN 1 WHEN 'tuesday' THEN 2 WHEN 'wednesday' THEN 3
                WHEN 'thursday' THEN 4 WHEN 'friday' THEN 5 WHEN 'saturday' THEN 6
                ELSE 7 END, start_time"
        ))
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching schedule");
            AppError::from(e)
        })
    }

    pub async fn get_entry(db: &SqlitePool, id: &str) -> Result<ScheduleEntry, AppError> {
        sqlx::query_as::<_, ScheduleEntry>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedule_entries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| entry_not_found(id))
    }

    #[instrument(skip(db, dto), fields(course.code = %dto.course_code, db.operation = "INSERT", db.table = "schedule_entries"))]
    pub async fn create_entry(
        db: &SqlitePool,
        dto: CreateScheduleEntryDto,
    ) -> Result<ScheduleEntry, AppError> {
        check_time_range(dto.start_time, dto.end_time)?;

        let entry = sqlx::query_as::<_, ScheduleEntry>(&format!(
            "INSERT INTO schedule_entries (id, course_code, day_of_week, start_time, end_time, room, instructor, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(time_based_id())
        .bind(&dto.course_code)
        .bind(&dto.day_of_week)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(&dto.room)
        .bind(&dto.instructor)
        .bind(Utc::now())
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating schedule entry");
            AppError::from(e)
        })?;

        info!(schedule.id = %entry.id, "Schedule entry created");
        Ok(entry)
    }

    #[instrument(skip(db, dto), fields(schedule.id = %id, db.operation = "UPDATE", db.table = "schedule_entries"))]
    pub async fn update_entry(
        db: &SqlitePool,
        id: &str,
        dto: UpdateScheduleEntryDto,
    ) -> Result<ScheduleEntry, AppError> {
        let current = Self::get_entry(db, id).await?;
        check_time_range(
            dto.start_time.unwrap_or(current.start_time),
            dto.end_time.unwrap_or(current.end_time),
        )?;

        sqlx::query_as::<_, ScheduleEntry>(&format!(
            "UPDATE schedule_entries SET
                course_code = COALESCE(?, course_code),
                day_of_week = COALESCE(?, day_of_week),
                start_time = COALESCE(?, start_time),
                end_time = COALESCE(?, end_time),
                room = COALESCE(?, room),
                instructor = COALESCE(?, instructor),
                updated_at = ?
             WHERE id = ?
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(&dto.course_code)
        .bind(&dto.day_of_week)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(&dto.room)
        .bind(&dto.instructor)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating schedule entry");
            AppError::from(e)
        })?
        .ok_or_else(|| entry_not_found(id))
    }

    /// Marks a class cancelled (with an optional note) or restores it.
    /// Restoring clears the note.
    #[instrument(skip(db, dto), fields(schedule.id = %id, cancelled = dto.is_cancelled, db.operation = "UPDATE", db.table = "schedule_entries"))]
    pub async fn set_cancellation(
        db: &SqlitePool,
        id: &str,
        dto: SetCancellationDto,
    ) -> Result<ScheduleEntry, AppError> {
        let note = if dto.is_cancelled { dto.note } else { None };

        sqlx::query_as::<_, ScheduleEntry>(&format!(
            "UPDATE schedule_entries SET is_cancelled = ?, cancellation_note = ?, updated_at = ?
             WHERE id = ?
             RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(dto.is_cancelled)
        .bind(&note)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| entry_not_found(id))
    }

    #[instrument(skip(db), fields(schedule.id = %id, db.operation = "DELETE", db.table = "schedule_entries"))]
    pub async fn delete_entry(db: &SqlitePool, id: &str) -> Result<ScheduleEntry, AppError> {
        let entry = sqlx::query_as::<_, ScheduleEntry>(&format!(
            "DELETE FROM schedule_entries WHERE id = ? RETURNING {SCHEDULE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error deleting schedule entry");
            AppError::from(e)
        })?
        .ok_or_else(|| entry_not_found(id))?;

        info!(schedule.id = %id, "Schedule entry deleted");
        Ok(entry)
    }
}
