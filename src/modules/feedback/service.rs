use anyhow::anyhow;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use coursehub_core::AppError;
use coursehub_core::ids::time_based_id;

use super::model::{Feedback, FeedbackKind, SubmitFeedbackDto};

const FEEDBACK_COLUMNS: &str = "id, kind, name, email, subject, body, created_at";

pub struct FeedbackService;

impl FeedbackService {
    #[instrument(skip(db, dto), fields(feedback.kind = %kind, db.operation = "INSERT", db.table = "feedback"))]
    pub async fn submit(
        db: &SqlitePool,
        kind: FeedbackKind,
        dto: SubmitFeedbackDto,
    ) -> Result<Feedback, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "INSERT INTO feedback (id, kind, name, email, subject, body, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(time_based_id())
        .bind(kind.as_str())
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.subject)
        .bind(&dto.body)
        .bind(Utc::now())
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error storing feedback");
            AppError::from(e)
        })?;

        info!(feedback.id = %feedback.id, "Feedback submitted");
        Ok(feedback)
    }

    #[instrument(skip(db), fields(feedback.kind = %kind, db.operation = "SELECT", db.table = "feedback"))]
    pub async fn list(db: &SqlitePool, kind: FeedbackKind) -> Result<Vec<Feedback>, AppError> {
        sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE kind = ? ORDER BY created_at DESC"
        ))
        .bind(kind.as_str())
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching feedback");
            AppError::from(e)
        })
    }

    /// Deletes one submission of `kind`; an id of another kind is not found.
    #[instrument(skip(db), fields(feedback.kind = %kind, feedback.id = %id, db.operation = "DELETE", db.table = "feedback"))]
    pub async fn delete(db: &SqlitePool, kind: FeedbackKind, id: &str) -> Result<Feedback, AppError> {
        sqlx::query_as::<_, Feedback>(&format!(
            "DELETE FROM feedback WHERE id = ? AND kind = ? RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(id)
        .bind(kind.as_str())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("{} {} not found", kind, id)))
    }
}
