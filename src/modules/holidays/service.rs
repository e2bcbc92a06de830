use anyhow::anyhow;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use coursehub_core::AppError;
use coursehub_core::ids::time_based_id;

use super::model::{CreateHolidayDto, Holiday, UpdateHolidayDto};

fn check_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::bad_request(anyhow!("end_date must not be before start_date")));
    }
    Ok(())
}

fn holiday_not_found(id: &str) -> AppError {
    AppError::not_found(anyhow!("Holiday {} not found", id))
}

pub struct HolidayService;

impl HolidayService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "holidays"))]
    pub async fn list_holidays(db: &SqlitePool) -> Result<Vec<Holiday>, AppError> {
        sqlx::query_as::<_, Holiday>(
            "SELECT id, title, start_date, end_date FROM holidays ORDER BY start_date",
        )
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching holidays");
            AppError::from(e)
        })
    }

    pub async fn get_holiday(db: &SqlitePool, id: &str) -> Result<Holiday, AppError> {
        sqlx::query_as::<_, Holiday>(
            "SELECT id, title, start_date, end_date FROM holidays WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| holiday_not_found(id))
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "holidays"))]
    pub async fn create_holiday(db: &SqlitePool, dto: CreateHolidayDto) -> Result<Holiday, AppError> {
        let end_date = dto.end_date.unwrap_or(dto.start_date);
        check_date_range(dto.start_date, end_date)?;

        let holiday = sqlx::query_as::<_, Holiday>(
            "INSERT INTO holidays (id, title, start_date, end_date) VALUES (?, ?, ?, ?)
             RETURNING id, title, start_date, end_date",
        )
        .bind(time_based_id())
        .bind(&dto.title)
        .bind(dto.start_date)
        .bind(end_date)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating holiday");
            AppError::from(e)
        })?;

        info!(holiday.id = %holiday.id, "Holiday created");
        Ok(holiday)
    }

    #[instrument(skip(db, dto), fields(holiday.id = %id, db.operation = "UPDATE", db.table = "holidays"))]
    pub async fn update_holiday(
        db: &SqlitePool,
        id: &str,
        dto: UpdateHolidayDto,
    ) -> Result<Holiday, AppError> {
        let current = Self::get_holiday(db, id).await?;
        let start_date = dto.start_date.unwrap_or(current.start_date);
        let end_date = dto.end_date.unwrap_or(current.end_date);
        check_date_range(start_date, end_date)?;

        sqlx::query_as::<_, Holiday>(
            "UPDATE holidays SET title = COALESCE(?, title), start_date = ?, end_date = ?
             WHERE id = ?
             RETURNING id, title, start_date, end_date",
        )
        .bind(&dto.title)
        .bind(start_date)
        .bind(end_date)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating holiday");
            AppError::from(e)
        })?
        .ok_or_else(|| holiday_not_found(id))
    }

    #[instrument(skip(db), fields(holiday.id = %id, db.operation = "DELETE", db.table = "holidays"))]
    pub async fn delete_holiday(db: &SqlitePool, id: &str) -> Result<Holiday, AppError> {
        let holiday = sqlx::query_as::<_, Holiday>(
            "DELETE FROM holidays WHERE id = ? RETURNING id, title, start_date, end_date",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| holiday_not_found(id))?;

        info!(holiday.id = %id, "Holiday deleted");
        Ok(holiday)
    }
}
