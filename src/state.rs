use std::sync::Arc;

use sqlx::SqlitePool;

use coursehub_config::{AuditConfig, CorsConfig, JwtConfig, RateLimitConfig, StorageConfig};
use coursehub_core::{FileStorage, LocalFileStorage};
use coursehub_db::init_db_pool;

use crate::modules::audit_logs::AuditLogger;
use crate::modules::deletion_requests::DeletionRegistry;
use crate::modules::deletion_requests::registry::DeletionContext;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub storage_config: StorageConfig,
    pub storage: Arc<dyn FileStorage>,
    pub deletions: Arc<DeletionRegistry>,
    pub audit: AuditLogger,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
        storage_config: StorageConfig,
        audit_config: AuditConfig,
    ) -> Self {
        let storage = LocalFileStorage::with_max_size(
            storage_config.upload_dir.clone(),
            storage_config.files_base_url.clone(),
            storage_config.max_upload_bytes,
        );

        Self {
            audit: AuditLogger::new(db.clone(), audit_config.retention),
            db,
            jwt_config,
            cors_config,
            rate_limit_config,
            storage_config,
            storage: Arc::new(storage),
            deletions: Arc::new(DeletionRegistry::standard()),
        }
    }

    pub fn deletion_context(&self) -> DeletionContext<'_> {
        DeletionContext {
            db: &self.db,
            storage: self.storage.as_ref(),
        }
    }
}

pub async fn init_app_state() -> Result<AppState, sqlx::Error> {
    let db = init_db_pool().await?;

    Ok(AppState::new(
        db,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        RateLimitConfig::from_env(),
        StorageConfig::from_env(),
        AuditConfig::from_env(),
    ))
}
