use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const DAYS_OF_WEEK: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn validate_day(day: &str) -> Result<(), ValidationError> {
    if DAYS_OF_WEEK.contains(&day) {
        Ok(())
    } else {
        Err(ValidationError::new("day_of_week")
            .with_message("day_of_week must be a lowercase weekday name".into()))
    }
}

/// One weekly class slot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleEntry {
    pub id: String,
    pub course_code: String,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    pub instructor: Option<String>,
    pub is_cancelled: bool,
    pub cancellation_note: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateScheduleEntryDto {
    #[validate(length(min = 1, max = 32, message = "course_code must be 1-32 characters"))]
    pub course_code: String,
    #[validate(custom(function = "validate_day"))]
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: Option<String>,
    pub instructor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateScheduleEntryDto {
    #[validate(length(min = 1, max = 32, message = "course_code must be 1-32 characters"))]
    pub course_code: Option<String>,
    #[validate(custom(function = "validate_day"))]
    pub day_of_week: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub room: Option<String>,
    pub instructor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetCancellationDto {
    pub is_cancelled: bool,
    #[validate(length(max = 500, message = "note must be at most 500 characters"))]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_week_validation() {
        let dto: CreateScheduleEntryDto = serde_json::from_value(serde_json::json!({
            "course_code": "CSE 4101",
            "day_of_week": "Funday",
            "start_time": "09:00:00",
            "end_time": "10:30:00"
        }))
        .unwrap();
        assert!(dto.validate().is_err());

        let dto = CreateScheduleEntryDto {
            day_of_week: "monday".to_string(),
            ..dto
        };
        assert!(dto.validate().is_ok());
    }
}
