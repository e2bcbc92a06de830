//! Administrative commands run outside the HTTP server.

use sqlx::SqlitePool;
use validator::Validate;

use coursehub_core::{AppError, PermissionMap, Role};

use crate::modules::users::model::{CreateUserDto, User};
use crate::modules::users::service::UserService;
use crate::validator::field_errors;

/// Creates an admin account. Admins hold every capability, so the permission
/// map is left empty.
pub async fn create_admin(
    db: &SqlitePool,
    username: &str,
    name: &str,
    password: &str,
) -> Result<User, AppError> {
    let dto = CreateUserDto {
        username: username.trim().to_string(),
        password: password.to_string(),
        name: name.trim().to_string(),
        role: Role::Admin,
        permissions: PermissionMap::new(),
    };
    dto.validate()
        .map_err(|e| field_errors(&e).into_app_error())?;

    UserService::create_user(db, dto).await
}

pub async fn list_admins(db: &SqlitePool) -> Result<Vec<User>, AppError> {
    UserService::list_admins(db).await
}
