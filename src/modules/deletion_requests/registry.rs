//! Kind → handler dispatch for deletions.
//!
//! Both the direct delete path and admin approval go through the same
//! [`DeletionHandler`], so a resource is removed identically either way.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use anyhow::anyhow;
use sqlx::SqlitePool;

use coursehub_core::{AppError, FileStorage};

use super::model::{DeletableKind, DeletionTarget};
use crate::modules::course_files::service::CourseFileService;
use crate::modules::courses::service::CourseService;
use crate::modules::exams::service::ExamService;
use crate::modules::notices::service::NoticeService;
use crate::modules::schedule::service::ScheduleService;
use crate::modules::syllabus::service::SyllabusService;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AppError>> + Send + 'a>>;

/// Stores a handler may touch.
#[derive(Clone, Copy)]
pub struct DeletionContext<'a> {
    pub db: &'a SqlitePool,
    pub storage: &'a dyn FileStorage,
}

pub trait DeletionHandler: Send + Sync {
    /// Human-readable summary of the target. 404 when it does not exist.
    fn describe<'a>(
        &'a self,
        ctx: DeletionContext<'a>,
        target: &'a DeletionTarget,
    ) -> HandlerFuture<'a>;

    /// Removes the target and returns its summary. 404 when it does not exist.
    fn delete<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget)
    -> HandlerFuture<'a>;
}

fn owning_course(target: &DeletionTarget) -> Result<&str, AppError> {
    target
        .course_id
        .as_deref()
        .ok_or_else(|| AppError::bad_request(anyhow!("course_id is required for this resource")))
}

struct CourseDeletion;

impl DeletionHandler for CourseDeletion {
    fn describe<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let course = CourseService::get_course(ctx.db, &target.resource_id).await?;
            Ok(format!("course {} ({})", course.code, course.title))
        })
    }

    fn delete<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let course = CourseService::delete_course(ctx.db, ctx.storage, &target.resource_id).await?;
            Ok(format!("course {} ({})", course.code, course.title))
        })
    }
}

struct FileDeletion;

impl DeletionHandler for FileDeletion {
    fn describe<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let course_id = owning_course(target)?;
            let file =
                CourseFileService::get_file(ctx.db, ctx.storage, course_id, &target.resource_id)
                    .await?;
            Ok(format!("file {} in course {}", file.name, course_id))
        })
    }

    fn delete<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let course_id = owning_course(target)?;
            let file =
                CourseFileService::delete_file(ctx.db, ctx.storage, course_id, &target.resource_id)
                    .await?;
            Ok(format!("file {} in course {}", file.name, course_id))
        })
    }
}

struct ExamDeletion;

impl DeletionHandler for ExamDeletion {
    fn describe<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let course_id = owning_course(target)?;
            let exam = ExamService::get_exam(ctx.db, course_id, &target.resource_id).await?;
            Ok(format!("exam {} in course {}", exam.title, course_id))
        })
    }

    fn delete<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let course_id = owning_course(target)?;
            let exam = ExamService::delete_exam(ctx.db, course_id, &target.resource_id).await?;
            Ok(format!("exam {} in course {}", exam.title, course_id))
        })
    }
}

struct ScheduleDeletion;

impl DeletionHandler for ScheduleDeletion {
    fn describe<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let entry = ScheduleService::get_entry(ctx.db, &target.resource_id).await?;
            Ok(format!(
                "schedule entry {} on {} at {}",
                entry.course_code, entry.day_of_week, entry.start_time
            ))
        })
    }

    fn delete<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let entry = ScheduleService::delete_entry(ctx.db, &target.resource_id).await?;
            Ok(format!(
                "schedule entry {} on {} at {}",
                entry.course_code, entry.day_of_week, entry.start_time
            ))
        })
    }
}

struct SyllabusDeletion;

impl DeletionHandler for SyllabusDeletion {
    fn describe<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let entry = SyllabusService::get_entry(ctx.db, &target.resource_id).await?;
            Ok(format!("syllabus for {}", entry.course_code))
        })
    }

    fn delete<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let entry = SyllabusService::delete_entry(ctx.db, &target.resource_id).await?;
            Ok(format!("syllabus for {}", entry.course_code))
        })
    }
}

struct NoticeDeletion;

impl DeletionHandler for NoticeDeletion {
    fn describe<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let notice = NoticeService::get_notice(ctx.db, ctx.storage, &target.resource_id).await?;
            Ok(format!("notice \"{}\"", notice.title))
        })
    }

    fn delete<'a>(&'a self, ctx: DeletionContext<'a>, target: &'a DeletionTarget) -> HandlerFuture<'a> {
        Box::pin(async move {
            let notice =
                NoticeService::delete_notice(ctx.db, ctx.storage, &target.resource_id).await?;
            Ok(format!("notice \"{}\"", notice.title))
        })
    }
}

/// Handlers by kind. Built once at startup and shared through `AppState`.
pub struct DeletionRegistry {
    handlers: HashMap<DeletableKind, Box<dyn DeletionHandler>>,
}

impl DeletionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: DeletableKind, handler: Box<dyn DeletionHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// Handlers for all six deletable kinds.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(DeletableKind::Course, Box::new(CourseDeletion));
        registry.register(DeletableKind::File, Box::new(FileDeletion));
        registry.register(DeletableKind::Exam, Box::new(ExamDeletion));
        registry.register(DeletableKind::Schedule, Box::new(ScheduleDeletion));
        registry.register(DeletableKind::Syllabus, Box::new(SyllabusDeletion));
        registry.register(DeletableKind::Notice, Box::new(NoticeDeletion));
        registry
    }

    pub fn handler(&self, kind: DeletableKind) -> Result<&dyn DeletionHandler, AppError> {
        self.handlers
            .get(&kind)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| {
                AppError::bad_request(anyhow!("No deletion handler registered for {}", kind))
            })
    }
}

impl Default for DeletionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for DeletionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(|kind| kind.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("DeletionRegistry").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_kind() {
        let registry = DeletionRegistry::standard();
        for kind in DeletableKind::ALL {
            assert!(registry.handler(kind).is_ok(), "{}", kind);
        }
    }

    #[test]
    fn test_missing_handler_is_bad_request() {
        let registry = DeletionRegistry::new();
        let err = registry.handler(DeletableKind::Notice).err().unwrap();
        assert_eq!(err.status.as_u16(), 400);
    }
}
