use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use coursehub_core::{Capability, Role};

use crate::modules::audit_logs::model::{
    AuditLogEntry, BatchDeleteAuditLogsDto, DeletedCountResponse,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse};
use crate::modules::course_files::model::CourseFile;
use crate::modules::courses::model::{Course, CreateCourseDto, UpdateCourseDto};
use crate::modules::deletion_requests::model::{
    ApprovalResponse, CreateDeletionRequestDto, DeletableKind, DeleteResponse, DeletionRequest,
    RejectionResponse, RequestStatus,
};
use crate::modules::exams::model::{CreateExamDto, Exam, UpdateExamDto};
use crate::modules::feedback::model::{Feedback, FeedbackKind, SubmitFeedbackDto};
use crate::modules::holidays::model::{CreateHolidayDto, Holiday, UpdateHolidayDto};
use crate::modules::notices::model::{CreateNoticeDto, Notice, UpdateNoticeDto};
use crate::modules::schedule::model::{
    CreateScheduleEntryDto, ScheduleEntry, SetCancellationDto, UpdateScheduleEntryDto,
};
use crate::modules::settings::model::{PortalSettings, UpdateSettingDto};
use crate::modules::syllabus::model::{SyllabusEntry, UpsertSyllabusDto};
use crate::modules::users::model::{
    ChangePasswordDto, CreateUserDto, MessageResponse, UpdateProfileDto, UpdateUserDto, User,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::change_password,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::course_files::controller::get_course_files,
        crate::modules::course_files::controller::upload_course_file,
        crate::modules::course_files::controller::delete_course_file,
        crate::modules::exams::controller::get_exams,
        crate::modules::exams::controller::get_course_exams,
        crate::modules::exams::controller::create_exam,
        crate::modules::exams::controller::update_exam,
        crate::modules::exams::controller::delete_exam,
        crate::modules::schedule::controller::get_schedule,
        crate::modules::schedule::controller::create_schedule_entry,
        crate::modules::schedule::controller::update_schedule_entry,
        crate::modules::schedule::controller::set_class_cancellation,
        crate::modules::schedule::controller::delete_schedule_entry,
        crate::modules::syllabus::controller::get_syllabi,
        crate::modules::syllabus::controller::get_syllabus,
        crate::modules::syllabus::controller::upsert_syllabus,
        crate::modules::syllabus::controller::delete_syllabus,
        crate::modules::notices::controller::get_notices,
        crate::modules::notices::controller::get_notice,
        crate::modules::notices::controller::create_notice,
        crate::modules::notices::controller::update_notice,
        crate::modules::notices::controller::attach_notice_document,
        crate::modules::notices::controller::delete_notice,
        crate::modules::holidays::controller::get_holidays,
        crate::modules::holidays::controller::create_holiday,
        crate::modules::holidays::controller::update_holiday,
        crate::modules::holidays::controller::delete_holiday,
        crate::modules::settings::controller::get_settings,
        crate::modules::settings::controller::update_welcome_message,
        crate::modules::settings::controller::update_breaking_news,
        crate::modules::feedback::controller::submit_feedback,
        crate::modules::feedback::controller::get_feedback,
        crate::modules::feedback::controller::delete_feedback,
        crate::modules::deletion_requests::controller::get_deletion_requests,
        crate::modules::deletion_requests::controller::create_deletion_request,
        crate::modules::deletion_requests::controller::approve_deletion_request,
        crate::modules::deletion_requests::controller::reject_deletion_request,
        crate::modules::audit_logs::controller::get_audit_logs,
        crate::modules::audit_logs::controller::delete_audit_log,
        crate::modules::audit_logs::controller::batch_delete_audit_logs,
        crate::modules::audit_logs::controller::clear_audit_logs,
    ),
    components(
        schemas(
            Role,
            Capability,
            User,
            CreateUserDto,
            UpdateUserDto,
            UpdateProfileDto,
            ChangePasswordDto,
            MessageResponse,
            LoginRequest,
            LoginResponse,
            ErrorResponse,
            Course,
            CreateCourseDto,
            UpdateCourseDto,
            CourseFile,
            Exam,
            CreateExamDto,
            UpdateExamDto,
            ScheduleEntry,
            CreateScheduleEntryDto,
            UpdateScheduleEntryDto,
            SetCancellationDto,
            SyllabusEntry,
            UpsertSyllabusDto,
            Notice,
            CreateNoticeDto,
            UpdateNoticeDto,
            Holiday,
            CreateHolidayDto,
            UpdateHolidayDto,
            PortalSettings,
            UpdateSettingDto,
            Feedback,
            FeedbackKind,
            SubmitFeedbackDto,
            DeletableKind,
            DeletionRequest,
            RequestStatus,
            CreateDeletionRequestDto,
            DeleteResponse,
            ApprovalResponse,
            RejectionResponse,
            AuditLogEntry,
            BatchDeleteAuditLogsDto,
            DeletedCountResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Username/password login"),
        (name = "Users", description = "Accounts, roles and capabilities"),
        (name = "Courses", description = "Course catalogue"),
        (name = "Course Files", description = "Course material uploads"),
        (name = "Exams", description = "Exam schedule"),
        (name = "Schedule", description = "Weekly timetable and class cancellations"),
        (name = "Syllabus", description = "Syllabi by course code"),
        (name = "Notices", description = "Notice board"),
        (name = "Holidays", description = "Academic holidays"),
        (name = "Settings", description = "Welcome message and breaking news"),
        (name = "Feedback", description = "Public messages, complaints and opinions"),
        (name = "Deletion Requests", description = "Deletions awaiting admin approval"),
        (name = "Audit Logs", description = "Record of every mutation")
    ),
    info(
        title = "CourseHub API",
        version = "0.1.0",
        description = "Course portal backend with capability-based editing and moderated deletions.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
