use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use coursehub_core::Capability;

use crate::modules::audit_logs::AuditAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Message,
    Complaint,
    Opinion,
}

impl FeedbackKind {
    pub const ALL: [FeedbackKind; 3] = [
        FeedbackKind::Message,
        FeedbackKind::Complaint,
        FeedbackKind::Opinion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Message => "message",
            FeedbackKind::Complaint => "complaint",
            FeedbackKind::Opinion => "opinion",
        }
    }

    /// Path segment under `/api`.
    pub fn route_segment(&self) -> &'static str {
        match self {
            FeedbackKind::Message => "messages",
            FeedbackKind::Complaint => "complaints",
            FeedbackKind::Opinion => "opinions",
        }
    }

    /// Capability needed to read and delete submissions of this kind.
    pub fn view_capability(&self) -> Capability {
        match self {
            FeedbackKind::Message => Capability::MessagesView,
            FeedbackKind::Complaint => Capability::ComplaintsView,
            FeedbackKind::Opinion => Capability::OpinionsView,
        }
    }

    pub fn submit_action(&self) -> AuditAction {
        match self {
            FeedbackKind::Message => AuditAction::SubmitMessage,
            FeedbackKind::Complaint => AuditAction::SubmitComplaint,
            FeedbackKind::Opinion => AuditAction::SubmitOpinion,
        }
    }

    pub fn delete_action(&self) -> AuditAction {
        match self {
            FeedbackKind::Message => AuditAction::DeleteMessage,
            FeedbackKind::Complaint => AuditAction::DeleteComplaint,
            FeedbackKind::Opinion => AuditAction::DeleteOpinion,
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for FeedbackKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FeedbackKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("Invalid feedback kind: {}", value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Feedback {
    pub id: String,
    #[sqlx(try_from = "String")]
    pub kind: FeedbackKind,
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitFeedbackDto {
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(max = 200, message = "subject must be at most 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "body must be 1-5000 characters"))]
    pub body: String,
}
