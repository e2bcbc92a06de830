use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::audit_logs::AuditAction;

/// Editable portal-wide text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    WelcomeMessage,
    BreakingNews,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::WelcomeMessage => "welcome_message",
            SettingKey::BreakingNews => "breaking_news",
        }
    }

    pub fn update_action(&self) -> AuditAction {
        match self {
            SettingKey::WelcomeMessage => AuditAction::UpdateWelcomeMessage,
            SettingKey::BreakingNews => AuditAction::UpdateBreakingNews,
        }
    }
}

/// Public view of the settings; unset values are empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PortalSettings {
    pub welcome_message: String,
    pub breaking_news: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingDto {
    #[validate(length(max = 2000, message = "value must be at most 2000 characters"))]
    pub value: String,
}
