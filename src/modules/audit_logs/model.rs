use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Verb recorded for every successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    // Accounts
    CreateUser,
    UpdateUser,
    DeleteUser,
    UpdateProfile,
    ChangePassword,

    // Courses and material
    CreateCourse,
    UpdateCourse,
    DeleteCourse,
    UploadFile,
    DeleteFile,
    CreateExam,
    UpdateExam,
    DeleteExam,

    // Timetable
    CreateSchedule,
    UpdateSchedule,
    DeleteSchedule,
    CancelClass,
    RestoreClass,
    UpdateSyllabus,
    DeleteSyllabus,
    CreateHoliday,
    UpdateHoliday,
    DeleteHoliday,

    // Notices and settings
    CreateNotice,
    UpdateNotice,
    AttachNoticeDocument,
    DeleteNotice,
    UpdateWelcomeMessage,
    UpdateBreakingNews,

    // Public feedback
    SubmitMessage,
    SubmitComplaint,
    SubmitOpinion,
    DeleteMessage,
    DeleteComplaint,
    DeleteOpinion,

    // Moderation
    ApproveDeletion,
    RejectDeletion,
    ClearAuditLogs,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CreateUser => "CREATE_USER",
            AuditAction::UpdateUser => "UPDATE_USER",
            AuditAction::DeleteUser => "DELETE_USER",
            AuditAction::UpdateProfile => "UPDATE_PROFILE",
            AuditAction::ChangePassword => "CHANGE_PASSWORD",
            AuditAction::CreateCourse => "CREATE_COURSE",
            AuditAction::UpdateCourse => "UPDATE_COURSE",
            AuditAction::DeleteCourse => "DELETE_COURSE",
            AuditAction::UploadFile => "UPLOAD_FILE",
            AuditAction::DeleteFile => "DELETE_FILE",
            AuditAction::CreateExam => "CREATE_EXAM",
            AuditAction::UpdateExam => "UPDATE_EXAM",
            AuditAction::DeleteExam => "DELETE_EXAM",
            AuditAction::CreateSchedule => "CREATE_SCHEDULE",
            AuditAction::UpdateSchedule => "UPDATE_SCHEDULE",
            AuditAction::DeleteSchedule => "DELETE_SCHEDULE",
            AuditAction::CancelClass => "CANCEL_CLASS",
            AuditAction::RestoreClass => "RESTORE_CLASS",
            AuditAction::UpdateSyllabus => "UPDATE_SYLLABUS",
            AuditAction::DeleteSyllabus => "DELETE_SYLLABUS",
            AuditAction::CreateHoliday => "CREATE_HOLIDAY",
            AuditAction::UpdateHoliday => "UPDATE_HOLIDAY",
            AuditAction::DeleteHoliday => "DELETE_HOLIDAY",
            AuditAction::CreateNotice => "CREATE_NOTICE",
            AuditAction::UpdateNotice => "UPDATE_NOTICE",
            AuditAction::AttachNoticeDocument => "ATTACH_NOTICE_DOCUMENT",
            AuditAction::DeleteNotice => "DELETE_NOTICE",
            AuditAction::UpdateWelcomeMessage => "UPDATE_WELCOME_MESSAGE",
            AuditAction::UpdateBreakingNews => "UPDATE_BREAKING_NEWS",
            AuditAction::SubmitMessage => "SUBMIT_MESSAGE",
            AuditAction::SubmitComplaint => "SUBMIT_COMPLAINT",
            AuditAction::SubmitOpinion => "SUBMIT_OPINION",
            AuditAction::DeleteMessage => "DELETE_MESSAGE",
            AuditAction::DeleteComplaint => "DELETE_COMPLAINT",
            AuditAction::DeleteOpinion => "DELETE_OPINION",
            AuditAction::ApproveDeletion => "APPROVE_DELETION",
            AuditAction::RejectDeletion => "REJECT_DELETION",
            AuditAction::ClearAuditLogs => "CLEAR_AUDIT_LOGS",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLogEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub action: String,
    pub username: String,
    pub details: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BatchDeleteAuditLogsDto {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedCountResponse {
    pub deleted: u64,
}
