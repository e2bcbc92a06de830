use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A course offering. `id` is the slug of `code` (`CSE 4101` is `cse-4101`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub title: String,
    pub credits: f64,
    pub semester: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 32, message = "code must be 1-32 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 30.0, message = "credits must be between 0 and 30"))]
    pub credits: f64,
    pub semester: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 0.0, max = 30.0, message = "credits must be between 0 and 30"))]
    pub credits: Option<f64>,
    pub semester: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_course_validation() {
        let dto = CreateCourseDto {
            code: "CSE 4101".to_string(),
            title: "Algorithms".to_string(),
            credits: 3.0,
            semester: None,
            description: None,
        };
        assert!(dto.validate().is_ok());

        let dto = CreateCourseDto {
            credits: 45.0,
            ..dto
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_credits_default_to_zero() {
        let dto: CreateCourseDto =
            serde_json::from_str(r#"{"code":"MAT 101","title":"Calculus"}"#).unwrap();
        assert_eq!(dto.credits, 0.0);
    }
}
