use coursehub_core::{Capability, Principal, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JWT claims for access tokens.
///
/// `role` and `permissions` reflect the account at login time; request
/// extractors re-read the account so revocations apply immediately.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Capabilities granted at issue time
    pub permissions: Vec<Capability>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
}

impl Principal for Claims {
    fn role(&self) -> Role {
        self.role
    }

    fn holds(&self, capability: Capability) -> bool {
        self.permissions.contains(&capability)
    }
}
