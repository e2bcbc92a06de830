use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};

use coursehub_core::AppError;

use super::model::{PortalSettings, SettingKey};

pub struct SettingsService;

impl SettingsService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "settings"))]
    pub async fn get_settings(db: &SqlitePool) -> Result<PortalSettings, AppError> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error fetching settings");
                AppError::from(e)
            })?;

        let mut settings = PortalSettings::default();
        for (key, value) in rows {
            if key == SettingKey::WelcomeMessage.as_str() {
                settings.welcome_message = value;
            } else if key == SettingKey::BreakingNews.as_str() {
                settings.breaking_news = value;
            }
        }
        Ok(settings)
    }

    #[instrument(skip(db, value), fields(setting.key = %key.as_str(), db.operation = "UPSERT", db.table = "settings"))]
    pub async fn set(
        db: &SqlitePool,
        key: SettingKey,
        value: &str,
        updated_by: &str,
    ) -> Result<PortalSettings, AppError> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_by, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_by = excluded.updated_by,
                updated_at = excluded.updated_at",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(updated_by)
        .bind(Utc::now())
        .execute(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error saving setting");
            AppError::from(e)
        })?;

        info!(setting.key = %key.as_str(), "Setting updated");
        Self::get_settings(db).await
    }
}
