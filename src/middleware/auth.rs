use anyhow::anyhow;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use coursehub_auth::{Claims, verify_token};
use coursehub_core::{AppError, Capability, Principal, Role, has_permission};

use crate::metrics;
use crate::modules::users::service::UserService;
use crate::state::AppState;

/// Authenticated session.
///
/// The token proves identity; role and capabilities are re-read from the
/// account on every request so revocations and deletions apply immediately.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }

    pub fn can(&self, capability: Capability) -> bool {
        has_permission(Some(self), capability)
    }

    /// Fails closed with 403 unless the capability is held.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        let allowed = self.can(capability);
        metrics::track_authorization_check(allowed, capability.as_str());

        if !allowed {
            debug!(user.id = %self.0.sub, capability = %capability, "Capability check failed");
            return Err(AppError::forbidden(anyhow!(
                "Access denied. Missing required capability: {}",
                capability
            )));
        }
        Ok(())
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        let allowed = self.is_admin();
        metrics::track_authorization_check(allowed, "admin");

        if !allowed {
            return Err(AppError::forbidden(anyhow!("Access denied. Admin role required")));
        }
        Ok(())
    }
}

impl Principal for AuthUser {
    fn role(&self) -> Role {
        self.0.role
    }

    fn holds(&self, capability: Capability) -> bool {
        self.0.holds(capability)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized(anyhow!("Missing authorization header")))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid authorization header format")))?;

        let mut claims = verify_token(token, &state.jwt_config).inspect_err(|_| {
            metrics::track_jwt_validation(false);
        })?;
        metrics::track_jwt_validation(true);

        let account = UserService::find_user(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized(anyhow!("Account no longer exists")))?;

        claims.username = account.username;
        claims.role = account.role;
        claims.permissions = account.permissions.granted();

        Ok(AuthUser(claims))
    }
}

/// Extractor for admin-only handlers.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        auth_user.require_admin()?;
        Ok(RequireAdmin(auth_user))
    }
}

/// Declares an extractor that admits only callers holding `$capability`.
#[macro_export]
macro_rules! require_capability {
    ($name:ident, $capability:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::coursehub_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;
                auth_user.require($capability)?;
                Ok($name(auth_user))
            }
        }
    };
}

require_capability!(RequireCoursesEdit, Capability::CoursesEdit);
require_capability!(RequireCourseMaterialsEdit, Capability::CourseMaterialsEdit);
require_capability!(RequireExamsEdit, Capability::ExamsEdit);
require_capability!(RequireScheduleEdit, Capability::ScheduleEdit);
require_capability!(RequireClassCancellationEdit, Capability::ClassCancellationEdit);
require_capability!(RequireSyllabusEdit, Capability::SyllabusEdit);
require_capability!(RequireNoticesEdit, Capability::NoticesEdit);
require_capability!(RequireWelcomeMessageEdit, Capability::WelcomeMessageEdit);
require_capability!(RequireBreakingNewsEdit, Capability::BreakingNewsEdit);

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(role: Role, permissions: Vec<Capability>) -> AuthUser {
        AuthUser(Claims {
            sub: "u-1".to_string(),
            username: "grace".to_string(),
            role,
            permissions,
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_require_grants_listed_capability() {
        let user = auth_user(Role::Editor, vec![Capability::ExamsEdit]);
        assert!(user.require(Capability::ExamsEdit).is_ok());
        let err = user.require(Capability::CoursesEdit).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_admin_passes_every_check() {
        let user = auth_user(Role::Admin, vec![]);
        assert!(user.require_admin().is_ok());
        for capability in Capability::ALL {
            assert!(user.require(capability).is_ok());
        }
    }

    #[test]
    fn test_editor_is_not_admin() {
        let user = auth_user(Role::Editor, Capability::ALL.to_vec());
        assert_eq!(user.require_admin().unwrap_err().status.as_u16(), 403);
    }
}
