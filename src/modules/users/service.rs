use anyhow::anyhow;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use coursehub_core::{AppError, Role, hash_password, verify_password};

use super::model::{ChangePasswordDto, CreateUserDto, UpdateProfileDto, UpdateUserDto, User};
use crate::metrics;

const USER_COLUMNS: &str = "id, username, name, role, permissions, created_at, updated_at";

/// Guard clause: true unless the row is the only remaining admin.
const NOT_LAST_ADMIN: &str =
    "(role != 'admin' OR (SELECT COUNT(*) FROM users WHERE role = 'admin') > 1)";

#[derive(sqlx::FromRow)]
struct Credentials {
    id: String,
    password_hash: String,
}

pub struct UserService;

impl UserService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_users(db: &SqlitePool) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY role, username"
        ))
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching users");
            AppError::from(e)
        })
    }

    pub async fn find_user(db: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
            .map_err(|e| {
                error!(user.id = %id, error = %e, "Database error fetching user");
                AppError::from(e)
            })
    }

    pub async fn get_user(db: &SqlitePool, id: &str) -> Result<User, AppError> {
        Self::find_user(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User with id {} not found", id)))
    }

    pub async fn find_by_username(db: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(db)
            .await
            .map_err(AppError::from)
    }

    #[instrument(skip(db, dto), fields(user.username = %dto.username, db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(db: &SqlitePool, dto: CreateUserDto) -> Result<User, AppError> {
        debug!(user.role = %dto.role, "Creating user");

        let password_hash = hash_password(&dto.password)?;
        let permissions = serde_json::to_string(&dto.permissions)?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, password_hash, name, role, permissions, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&dto.username)
        .bind(&password_hash)
        .bind(&dto.name)
        .bind(dto.role.as_str())
        .bind(&permissions)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
        .map_err(|e| username_conflict(e, &dto.username))?;

        metrics::track_user_created(user.role.as_str());
        info!(user.id = %user.id, user.username = %user.username, "User created");

        Ok(user)
    }

    /// Admin update of name, role and capabilities.
    ///
    /// Demoting the last admin is rejected with 409 and leaves the row unchanged.
    #[instrument(skip(db, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(db: &SqlitePool, id: &str, dto: UpdateUserDto) -> Result<User, AppError> {
        let now = Utc::now();
        let mut tx = db.begin().await?;

        if dto.role == Some(Role::Editor) {
            let demoted = sqlx::query(&format!(
                "UPDATE users SET role = 'editor', updated_at = ? WHERE id = ? AND {NOT_LAST_ADMIN}"
            ))
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            if demoted.rows_affected() == 0 {
                return Err(Self::missing_or_last_admin(&mut tx, id).await?);
            }
        } else if dto.role == Some(Role::Admin) {
            sqlx::query("UPDATE users SET role = 'admin', updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let permissions = dto
            .permissions
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE(?, name),
                 permissions = COALESCE(?, permissions),
                 updated_at = ?
             WHERE id = ?
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&permissions)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User with id {} not found", id)))?;

        tx.commit().await?;

        info!(user.id = %id, user.role = %user.role, "User updated");
        Ok(user)
    }

    /// Deletes an account unless it is the last admin.
    #[instrument(skip(db), fields(user.id = %id, db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(db: &SqlitePool, id: &str) -> Result<User, AppError> {
        let mut tx = db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = ? AND {NOT_LAST_ADMIN} RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!(user.id = %id, error = %e, "Database error deleting user");
            AppError::from(e)
        })?;

        let Some(user) = user else {
            return Err(Self::missing_or_last_admin(&mut tx, id).await?);
        };

        tx.commit().await?;

        info!(user.id = %id, user.username = %user.username, "User deleted");
        Ok(user)
    }

    /// Explains why a guarded statement touched no rows.
    async fn missing_or_last_admin(
        tx: &mut sqlx::SqliteConnection,
        id: &str,
    ) -> Result<AppError, AppError> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        Ok(match exists {
            None => AppError::not_found(anyhow!("User with id {} not found", id)),
            Some(_) => {
                warn!(user.id = %id, "Refused to remove the last admin");
                AppError::conflict(anyhow!("At least one admin must remain"))
            }
        })
    }

    #[instrument(skip(db, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_profile(
        db: &SqlitePool,
        id: &str,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        let username = dto.username.clone().unwrap_or_default();

        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE(?, name),
                 username = COALESCE(?, username),
                 updated_at = ?
             WHERE id = ?
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.username)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| username_conflict(e, &username))?
        .ok_or_else(|| AppError::not_found(anyhow!("User with id {} not found", id)))
    }

    #[instrument(skip(db, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn change_password(
        db: &SqlitePool,
        id: &str,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let current: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?;
        let (password_hash,) =
            current.ok_or_else(|| AppError::not_found(anyhow!("User with id {} not found", id)))?;

        if !verify_password(&dto.current_password, &password_hash)? {
            return Err(AppError::bad_request(anyhow!("Current password is incorrect")));
        }

        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(hash_password(&dto.new_password)?)
            .bind(Utc::now())
            .bind(id)
            .execute(db)
            .await?;

        info!(user.id = %id, "Password changed");
        Ok(())
    }

    /// Checks a username/password pair. `None` on unknown user or wrong password.
    #[instrument(skip(db, password), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn authenticate(
        db: &SqlitePool,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let credentials = sqlx::query_as::<_, Credentials>(
            "SELECT id, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(db)
        .await?;

        let Some(credentials) = credentials else {
            return Ok(None);
        };

        if !verify_password(password, &credentials.password_hash)? {
            return Ok(None);
        }

        Self::find_user(db, &credentials.id).await
    }

    pub async fn list_admins(db: &SqlitePool) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = 'admin' ORDER BY created_at"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::from)
    }
}

fn username_conflict(e: sqlx::Error, username: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        warn!(user.username = %username, "Username already taken");
        return AppError::bad_request(anyhow!("Username already exists"));
    }
    error!(error = %e, "Database error writing user");
    AppError::from(e)
}
