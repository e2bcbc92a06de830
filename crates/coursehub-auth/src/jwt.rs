//! JWT creation and verification for access tokens (HS256).

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use coursehub_config::JwtConfig;
use coursehub_core::{AppError, Capability, Role};

use crate::claims::Claims;

/// Creates a signed access token for a user.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_access_token(
    user_id: &str,
    username: &str,
    role: Role,
    permissions: Vec<Capability>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        permissions,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry and returns the embedded claims.
///
/// # Errors
///
/// Returns 401 for a bad signature, an expired token or malformed input.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow!("Invalid or expired token")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_verify_token_returns_claims() {
        let config = test_config();
        let token = create_access_token(
            "u-1",
            "dana",
            Role::Editor,
            vec![Capability::NoticesEdit, Capability::ExamsEdit],
            &config,
        )
        .unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "dana");
        assert_eq!(claims.role, Role::Editor);
        assert_eq!(
            claims.permissions,
            vec![Capability::NoticesEdit, Capability::ExamsEdit]
        );
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_token_rejects_garbage() {
        let err = verify_token("not-a-token", &test_config()).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_verify_token_rejects_wrong_secret() {
        let token = create_access_token("u-1", "dana", Role::Admin, vec![], &test_config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret-key-at-least-32-characters".to_string(),
            access_token_expiry: 3600,
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_verify_token_rejects_expired() {
        let config = JwtConfig {
            access_token_expiry: 0,
            ..test_config()
        };
        // Default validation allows 60s leeway, so forge an old token directly.
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "u-1".to_string(),
            username: "dana".to_string(),
            role: Role::Editor,
            permissions: vec![],
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
