pub mod audit_logs;
pub mod auth;
pub mod course_files;
pub mod courses;
pub mod deletion_requests;
pub mod exams;
pub mod feedback;
pub mod holidays;
pub mod notices;
pub mod schedule;
pub mod settings;
pub mod syllabus;
pub mod users;
