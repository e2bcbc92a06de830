use anyhow::anyhow;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use coursehub_auth::create_access_token;
use coursehub_config::JwtConfig;
use coursehub_core::AppError;

use super::model::{LoginRequest, LoginResponse};
use crate::metrics;
use crate::modules::users::service::UserService;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(user.username = %dto.username))]
    pub async fn login_user(
        db: &SqlitePool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let user = UserService::authenticate(db, &dto.username, &dto.password)
            .await?
            .ok_or_else(|| {
                warn!(user.username = %dto.username, "Failed login attempt");
                metrics::track_user_login_failure("invalid_credentials");
                AppError::unauthorized(anyhow!("Invalid username or password"))
            })?;

        let access_token = create_access_token(
            &user.id,
            &user.username,
            user.role,
            user.permissions.granted(),
            jwt_config,
        )?;

        metrics::track_jwt_issued();
        metrics::track_user_login_success(user.role.as_str());
        info!(user.id = %user.id, "User logged in");

        Ok(LoginResponse { access_token, user })
    }
}
