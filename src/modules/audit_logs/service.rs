use anyhow::anyhow;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, error, info, instrument};

use coursehub_core::AppError;
use coursehub_core::ids::time_based_id;

use super::model::{AuditAction, AuditLogEntry};
use crate::metrics;

/// Username recorded for unauthenticated actions (public feedback).
pub const ANONYMOUS_ACTOR: &str = "Unknown";

/// Append-only audit writer shared through `AppState`.
///
/// Writes never fail from the caller's point of view: storage errors are
/// logged and counted, then dropped.
#[derive(Clone, Debug)]
pub struct AuditLogger {
    db: SqlitePool,
    retention: i64,
}

impl AuditLogger {
    pub fn new(db: SqlitePool, retention: i64) -> Self {
        Self {
            db,
            retention: retention.max(1),
        }
    }

    pub fn retention(&self) -> i64 {
        self.retention
    }

    #[instrument(skip(self, details), fields(audit.action = %action, db.operation = "INSERT", db.table = "audit_logs"))]
    pub async fn record(&self, action: AuditAction, username: &str, details: impl Into<String>) {
        let details = details.into();

        if let Err(e) = self.append(action, username, &details).await {
            error!(
                audit.action = %action,
                username = %username,
                error = %e,
                "Failed to write audit log entry"
            );
            metrics::track_audit_write_failure(action.as_str());
        }
    }

    async fn append(
        &self,
        action: AuditAction,
        username: &str,
        details: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO audit_logs (id, date, action, username, details) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(time_based_id())
        .bind(Utc::now())
        .bind(action.as_str())
        .bind(username)
        .bind(details)
        .execute(&self.db)
        .await?;

        // Keep only the newest `retention` rows.
        let trimmed = sqlx::query(
            "DELETE FROM audit_logs WHERE seq <= (
                SELECT seq FROM audit_logs ORDER BY seq DESC LIMIT 1 OFFSET ?
            )",
        )
        .bind(self.retention)
        .execute(&self.db)
        .await?;

        if trimmed.rows_affected() > 0 {
            debug!(trimmed = trimmed.rows_affected(), "Trimmed audit log to retention limit");
        }

        Ok(())
    }
}

pub struct AuditLogService;

impl AuditLogService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "audit_logs"))]
    pub async fn list(db: &SqlitePool) -> Result<Vec<AuditLogEntry>, AppError> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT id, date, action, username, details FROM audit_logs ORDER BY seq DESC",
        )
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching audit logs");
            AppError::from(e)
        })
    }

    #[instrument(skip(db), fields(audit.id = %id, db.operation = "DELETE", db.table = "audit_logs"))]
    pub async fn delete_one(db: &SqlitePool, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM audit_logs WHERE id = ?")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(audit.id = %id, error = %e, "Database error deleting audit log");
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            debug!(audit.id = %id, "Audit log entry not found");
            return Err(AppError::not_found(anyhow!("Audit log entry not found")));
        }

        Ok(())
    }

    /// Deletes every listed entry that exists. Unknown ids are skipped.
    #[instrument(skip(db, ids), fields(ids.count = ids.len(), db.operation = "DELETE", db.table = "audit_logs"))]
    pub async fn delete_many(db: &SqlitePool, ids: &[String]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM audit_logs WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(db).await.map_err(|e| {
            error!(error = %e, "Database error batch deleting audit logs");
            AppError::from(e)
        })?;

        info!(deleted = result.rows_affected(), requested = ids.len(), "Audit log entries deleted");
        Ok(result.rows_affected())
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "audit_logs"))]
    pub async fn clear(db: &SqlitePool) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM audit_logs")
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error clearing audit logs");
                AppError::from(e)
            })?;

        info!(deleted = result.rows_affected(), "Audit log cleared");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn details(db: &SqlitePool) -> Vec<String> {
        AuditLogService::list(db)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.details)
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_is_newest_first(pool: SqlitePool) {
        let audit = AuditLogger::new(pool.clone(), 10);
        audit.record(AuditAction::CreateCourse, "ada", "first").await;
        audit.record(AuditAction::UpdateCourse, "ada", "second").await;

        let entries = AuditLogService::list(&pool).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].details, "second");
        assert_eq!(entries[0].action, "UPDATE_COURSE");
        assert_eq!(entries[1].action, "CREATE_COURSE");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_trims_to_retention(pool: SqlitePool) {
        let audit = AuditLogger::new(pool.clone(), 3);
        for i in 0..5 {
            audit
                .record(AuditAction::CreateNotice, "ada", format!("n{}", i))
                .await;
        }

        assert_eq!(details(&pool).await, vec!["n4", "n3", "n2"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_record_swallows_store_failure(pool: SqlitePool) {
        sqlx::query("DROP TABLE audit_logs")
            .execute(&pool)
            .await
            .unwrap();

        // Must not panic or surface an error.
        AuditLogger::new(pool, 10)
            .record(AuditAction::DeleteExam, "ada", "gone")
            .await;
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_many_ignores_unknown_ids(pool: SqlitePool) {
        let audit = AuditLogger::new(pool.clone(), 10);
        audit.record(AuditAction::CreateHoliday, "ada", "a").await;
        audit.record(AuditAction::CreateHoliday, "ada", "b").await;
        let ids: Vec<String> = AuditLogService::list(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .chain(std::iter::once("missing-id".to_string()))
            .collect();

        assert_eq!(AuditLogService::delete_many(&pool, &ids).await.unwrap(), 2);
        assert_eq!(AuditLogService::delete_many(&pool, &[]).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_one_missing_is_not_found(pool: SqlitePool) {
        let err = AuditLogService::delete_one(&pool, "nope").await.unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }
}
