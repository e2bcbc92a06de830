use anyhow::anyhow;
use chrono::{Duration, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument, warn};

use coursehub_core::AppError;
use coursehub_core::ids::time_based_id;

use super::model::{DeletableKind, DeleteResponse, DeletionRequest, DeletionTarget};
use crate::metrics;
use crate::middleware::auth::AuthUser;
use crate::modules::audit_logs::AuditAction;
use crate::state::AppState;

const REQUEST_COLUMNS: &str = "id, type, resource_id, details, requested_by, date, status";

/// Minutes after which an approval claim is treated as abandoned.
pub const CLAIM_TIMEOUT_MINUTES: i64 = 5;

/// Outcome of a successful approval.
#[derive(Debug)]
pub struct Approval {
    pub request: DeletionRequest,
    pub kind: DeletableKind,
    pub summary: String,
}

pub struct DeletionRequestService;

impl DeletionRequestService {
    /// Files a pending request. `kind` is stored as given; it is resolved only
    /// when an admin approves.
    #[instrument(skip(db, details), fields(request.kind = %kind, request.resource_id = %resource_id, db.operation = "INSERT", db.table = "deletion_requests"))]
    pub async fn submit(
        db: &SqlitePool,
        kind: &str,
        resource_id: &str,
        details: Option<Value>,
        requested_by: &str,
    ) -> Result<DeletionRequest, AppError> {
        if kind.trim().is_empty() {
            return Err(AppError::bad_request(anyhow!("type is required")));
        }

        let details = match details {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(details @ Value::Object(_)) => details,
            Some(_) => {
                return Err(AppError::bad_request(anyhow!("details must be a JSON object")));
            }
        };

        let request = sqlx::query_as::<_, DeletionRequest>(&format!(
            "INSERT INTO deletion_requests (id, type, resource_id, details, requested_by, date, status)
             VALUES (?, ?, ?, ?, ?, ?, 'pending')
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(time_based_id())
        .bind(kind)
        .bind(resource_id)
        .bind(serde_json::to_string(&details)?)
        .bind(requested_by)
        .bind(Utc::now())
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating deletion request");
            AppError::from(e)
        })?;

        metrics::track_deletion_request("submitted", kind);
        info!(request.id = %request.id, requested_by = %requested_by, "Deletion request submitted");
        Ok(request)
    }

    /// Pending requests, oldest first. Rows mid-approval are not listed;
    /// abandoned claims are released first.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "deletion_requests"))]
    pub async fn list_pending(db: &SqlitePool) -> Result<Vec<DeletionRequest>, AppError> {
        Self::release_stale_claims(db).await?;

        sqlx::query_as::<_, DeletionRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM deletion_requests
             WHERE status = 'pending'
             ORDER BY date, id"
        ))
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching deletion requests");
            AppError::from(e)
        })
    }

    pub async fn get_request(db: &SqlitePool, id: &str) -> Result<DeletionRequest, AppError> {
        sqlx::query_as::<_, DeletionRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM deletion_requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Deletion request {} not found", id)))
    }

    /// Approves a request: resolves its kind and target, claims the row,
    /// dispatches through the registry, then removes the row.
    ///
    /// Validation failures leave the request pending. A failed dispatch
    /// returns the claimed row to pending before the error is surfaced. A claim
    /// left behind by an interrupted approval expires after [`CLAIM_TIMEOUT_MINUTES`].
    #[instrument(skip(state), fields(request.id = %id, admin = %admin))]
    pub async fn approve(state: &AppState, id: &str, admin: &str) -> Result<Approval, AppError> {
        Self::release_stale_claims(&state.db).await?;
        let request = Self::get_request(&state.db, id).await?;

        let kind: DeletableKind = request.kind.parse()?;
        let target = DeletionTarget::from_request(kind, &request.resource_id, &request.details)?;
        let handler = state.deletions.handler(kind)?;

        Self::claim(&state.db, id).await?;

        let ctx = state.deletion_context();
        let summary = match handler.delete(ctx, &target).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(request.id = %id, error = %e.message(), "Deletion dispatch failed, releasing request");
                Self::release(&state.db, id).await;
                return Err(e);
            }
        };

        // The resource is gone at this point, so the approval stands even if the
        // row cannot be removed. Its claim expires and an admin can reject it.
        if let Err(e) = sqlx::query("DELETE FROM deletion_requests WHERE id = ?")
            .bind(id)
            .execute(&state.db)
            .await
        {
            error!(request.id = %id, error = %e, "Database error removing approved request");
        }

        state
            .audit
            .record(
                AuditAction::ApproveDeletion,
                admin,
                format!(
                    "Approved deletion of {} {} requested by {}: {}",
                    kind, request.resource_id, request.requested_by, summary
                ),
            )
            .await;

        metrics::track_deletion_request("approved", kind.as_str());
        info!(request.id = %id, kind = %kind, "Deletion request approved");
        Ok(Approval {
            request,
            kind,
            summary,
        })
    }

    /// Discards a request without touching the resource.
    #[instrument(skip(state), fields(request.id = %id, admin = %admin))]
    pub async fn reject(state: &AppState, id: &str, admin: &str) -> Result<DeletionRequest, AppError> {
        Self::release_stale_claims(&state.db).await?;

        let request = sqlx::query_as::<_, DeletionRequest>(&format!(
            "DELETE FROM deletion_requests WHERE id = ? AND status = 'pending' RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| {
            error!(request.id = %id, error = %e, "Database error rejecting deletion request");
            AppError::from(e)
        })?;

        let request = match request {
            Some(request) => request,
            None => {
                // Either absent or being approved right now.
                let existing = Self::get_request(&state.db, id).await?;
                return Err(AppError::conflict(anyhow!(
                    "Deletion request {} is already being processed",
                    existing.id
                )));
            }
        };

        state
            .audit
            .record(
                AuditAction::RejectDeletion,
                admin,
                format!(
                    "Rejected deletion of {} {} requested by {}",
                    request.kind, request.resource_id, request.requested_by
                ),
            )
            .await;

        metrics::track_deletion_request("rejected", &request.kind);
        info!(request.id = %id, "Deletion request rejected");
        Ok(request)
    }

    /// Delete entry point for the six deletable kinds.
    ///
    /// The target must exist. Callers holding the kind's capability delete it
    /// immediately; everyone else gets a pending request filed in their name.
    #[instrument(skip(state, user, target), fields(user.id = %user.user_id(), kind = %kind, resource_id = %target.resource_id))]
    pub async fn delete_or_request(
        state: &AppState,
        user: &AuthUser,
        kind: DeletableKind,
        target: DeletionTarget,
    ) -> Result<DeleteResponse, AppError> {
        let handler = state.deletions.handler(kind)?;
        let ctx = state.deletion_context();
        let summary = handler.describe(ctx, &target).await?;

        if !user.can(kind.capability()) {
            debug!(capability = %kind.capability(), "Caller lacks capability, filing deletion request");
            let request = Self::submit(
                &state.db,
                kind.as_str(),
                &target.resource_id,
                Some(target.request_details(&summary)),
                user.username(),
            )
            .await?;
            return Ok(DeleteResponse::PendingApproval { request });
        }

        let summary = handler.delete(ctx, &target).await?;

        state
            .audit
            .record(kind.delete_action(), user.username(), format!("Deleted {}", summary))
            .await;
        metrics::track_direct_deletion(kind.as_str());

        Ok(DeleteResponse::Deleted {
            kind,
            resource_id: target.resource_id,
            summary,
        })
    }

    /// `pending` → `approved`. Only one caller can win.
    async fn claim(db: &SqlitePool, id: &str) -> Result<(), AppError> {
        let claimed = sqlx::query(
            "UPDATE deletion_requests SET status = 'approved', claimed_at = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .execute(db)
        .await?;

        if claimed.rows_affected() == 0 {
            return Err(AppError::conflict(anyhow!(
                "Deletion request {} is already being processed",
                id
            )));
        }
        Ok(())
    }

    async fn release(db: &SqlitePool, id: &str) {
        if let Err(e) = sqlx::query(
            "UPDATE deletion_requests SET status = 'pending', claimed_at = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(db)
        .await
        {
            error!(request.id = %id, error = %e, "Failed to return deletion request to pending");
        }
    }

    /// Returns claims older than [`CLAIM_TIMEOUT_MINUTES`] (or without a claim time)
    /// to pending, so an interrupted approval never strands a request.
    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "deletion_requests"))]
    pub async fn release_stale_claims(db: &SqlitePool) -> Result<u64, AppError> {
        let cutoff = (Utc::now() - Duration::minutes(CLAIM_TIMEOUT_MINUTES)).timestamp_millis();
        let released = sqlx::query(
            "UPDATE deletion_requests SET status = 'pending', claimed_at = NULL
             WHERE status = 'approved' AND (claimed_at IS NULL OR claimed_at < ?)",
        )
        .bind(cutoff)
        .execute(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error releasing stale deletion claims");
            AppError::from(e)
        })?
        .rows_affected();

        if released > 0 {
            warn!(released, "Released abandoned deletion request claims");
        }
        Ok(released)
    }
}
