use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_PROFESSIONAL: &str = "PROFESIONAL";

#[derive(Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Body returned by the login endpoint.
#[derive(Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(alias = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthResponse {
    /// Split into the opaque token and the profile that is persisted beside it.
    pub fn into_parts(self) -> (String, UserProfile) {
        let profile = UserProfile {
            id: self.id,
            username: self.username,
            email: self.email,
            nombre_completo: self.nombre_completo,
            roles: self.roles,
            token_type: self.token_type,
        };
        (self.token, profile)
    }
}

/// The signed-in user as the console remembers it between runs.
///
/// Roles are taken from the login response as-is; nothing here is verified
/// against the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl UserProfile {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn display_name(&self) -> &str {
        match self.nombre_completo.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}
