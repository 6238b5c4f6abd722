use std::fmt;

use terapia_core::models::auth::{ROLE_ADMIN, ROLE_PROFESSIONAL, UserProfile};

/// What the console believes about the signed-in user.
///
/// Authenticated means a token is present; roles are derived predicates on
/// the stored profile, not separate states.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub profile: Option<UserProfile>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.profile.as_ref().is_some_and(|p| p.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.has_role(ROLE_ADMIN)
    }

    pub fn is_professional(&self) -> bool {
        self.is_authenticated() && self.has_role(ROLE_PROFESSIONAL)
    }

    /// Full name if known, else the username; empty when signed out.
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(UserProfile::display_name)
            .unwrap_or_default()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "****"))
            .field("profile", &self.profile)
            .finish()
    }
}
