use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use coursehub_core::{AppError, Capability};

use crate::modules::audit_logs::AuditAction;

/// Resource kinds that go through the deletion workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeletableKind {
    Course,
    File,
    Exam,
    Schedule,
    Syllabus,
    Notice,
}

impl DeletableKind {
    pub const ALL: [DeletableKind; 6] = [
        DeletableKind::Course,
        DeletableKind::File,
        DeletableKind::Exam,
        DeletableKind::Schedule,
        DeletableKind::Syllabus,
        DeletableKind::Notice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeletableKind::Course => "course",
            DeletableKind::File => "file",
            DeletableKind::Exam => "exam",
            DeletableKind::Schedule => "schedule",
            DeletableKind::Syllabus => "syllabus",
            DeletableKind::Notice => "notice",
        }
    }

    /// Capability that allows deleting this kind directly.
    pub fn capability(&self) -> Capability {
        match self {
            DeletableKind::Course => Capability::CoursesEdit,
            DeletableKind::File => Capability::CourseMaterialsEdit,
            DeletableKind::Exam => Capability::ExamsEdit,
            DeletableKind::Schedule => Capability::ScheduleEdit,
            DeletableKind::Syllabus => Capability::SyllabusEdit,
            DeletableKind::Notice => Capability::NoticesEdit,
        }
    }

    pub fn delete_action(&self) -> AuditAction {
        match self {
            DeletableKind::Course => AuditAction::DeleteCourse,
            DeletableKind::File => AuditAction::DeleteFile,
            DeletableKind::Exam => AuditAction::DeleteExam,
            DeletableKind::Schedule => AuditAction::DeleteSchedule,
            DeletableKind::Syllabus => AuditAction::DeleteSyllabus,
            DeletableKind::Notice => AuditAction::DeleteNotice,
        }
    }

    /// Files and exams are addressed within their owning course.
    pub fn needs_course_id(&self) -> bool {
        matches!(self, DeletableKind::File | DeletableKind::Exam)
    }
}

impl fmt::Display for DeletableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletableKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeletableKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::bad_request(anyhow!("Unknown deletion request type: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
}

impl TryFrom<String> for RequestStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            other => Err(format!("Invalid deletion request status: {}", other)),
        }
    }
}

/// A pending (or mid-approval) request to delete a resource.
///
/// `type` is kept as submitted; it is only resolved against the registry at
/// approval time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DeletionRequest {
    pub id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub resource_id: String,
    #[sqlx(json)]
    #[schema(value_type = Object)]
    pub details: Value,
    pub requested_by: String,
    pub date: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDeletionRequestDto {
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub kind: String,
    #[validate(length(min = 1, message = "resource_id is required"))]
    #[serde(alias = "resourceId")]
    pub resource_id: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// What a deletion handler operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTarget {
    pub resource_id: String,
    pub course_id: Option<String>,
}

impl DeletionTarget {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            course_id: None,
        }
    }

    pub fn in_course(course_id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            course_id: Some(course_id.into()),
        }
    }

    /// Rebuilds the target of a stored request. Files and exams need the owning
    /// course id in `details.course_id` (or `details.courseId`).
    pub fn from_request(
        kind: DeletableKind,
        resource_id: &str,
        details: &Value,
    ) -> Result<Self, AppError> {
        if !kind.needs_course_id() {
            return Ok(Self::new(resource_id));
        }

        let course_id = ["course_id", "courseId"]
            .iter()
            .find_map(|key| details.get(*key).and_then(Value::as_str))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::bad_request(anyhow!(
                    "Deletion request for {} {} is missing details.course_id",
                    kind,
                    resource_id
                ))
            })?;

        Ok(Self::in_course(course_id, resource_id))
    }

    /// Details stored with a request created on the caller's behalf.
    pub fn request_details(&self, summary: &str) -> Value {
        let mut details = Map::new();
        if let Some(course_id) = &self.course_id {
            details.insert("course_id".to_string(), json!(course_id));
        }
        details.insert("summary".to_string(), json!(summary));
        Value::Object(details)
    }
}

/// Result of a delete on one of the six deletable kinds.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteResponse {
    /// Deleted immediately (HTTP 200).
    Deleted {
        #[serde(rename = "type")]
        kind: DeletableKind,
        resource_id: String,
        summary: String,
    },
    /// Caller lacks the capability; a request awaits admin approval (HTTP 202).
    PendingApproval { request: DeletionRequest },
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        let status = match self {
            DeleteResponse::Deleted { .. } => StatusCode::OK,
            DeleteResponse::PendingApproval { .. } => StatusCode::ACCEPTED,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApprovalResponse {
    pub status: String,
    #[serde(rename = "type")]
    pub kind: DeletableKind,
    pub resource_id: String,
    pub summary: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RejectionResponse {
    pub status: String,
    pub request: DeletionRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("course".parse::<DeletableKind>().unwrap(), DeletableKind::Course);
        let err = "widget".parse::<DeletableKind>().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_capability_for_each_kind() {
        assert_eq!(DeletableKind::File.capability(), Capability::CourseMaterialsEdit);
        assert_eq!(DeletableKind::Schedule.capability(), Capability::ScheduleEdit);
        assert_eq!(DeletableKind::Notice.delete_action(), AuditAction::DeleteNotice);
    }

    #[test]
    fn test_target_reads_either_course_id_spelling() {
        let snake = DeletionTarget::from_request(
            DeletableKind::File,
            "f-1",
            &json!({"course_id": "cse-4101"}),
        )
        .unwrap();
        let camel =
            DeletionTarget::from_request(DeletableKind::Exam, "e-1", &json!({"courseId": "cse-4101"}))
                .unwrap();

        assert_eq!(snake, DeletionTarget::in_course("cse-4101", "f-1"));
        assert_eq!(camel.course_id.as_deref(), Some("cse-4101"));
    }

    #[test]
    fn test_target_requires_course_id_for_files() {
        let err = DeletionTarget::from_request(DeletableKind::File, "f-1", &json!({}))
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let course = DeletionTarget::from_request(DeletableKind::Course, "cse-4101", &json!({}))
            .unwrap();
        assert_eq!(course.course_id, None);
    }

    #[test]
    fn test_delete_response_shape() {
        let body = serde_json::to_value(DeleteResponse::Deleted {
            kind: DeletableKind::Syllabus,
            resource_id: "CSE-4101".to_string(),
            summary: "syllabus CSE-4101".to_string(),
        })
        .unwrap();
        assert_eq!(body["status"], "deleted");
        assert_eq!(body["type"], "syllabus");
    }
}
