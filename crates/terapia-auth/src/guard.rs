use terapia_core::models::auth::{ROLE_ADMIN, UserProfile};

use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";

pub const ADMIN_LANDING: &str = "/profesionales";

pub const STAFF_LANDING: &str = "/terapias";

/// Route-entry requirement attached to a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    Authenticated,
    Admin,
}

/// Where the router should send the user instead of the requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    /// Path to resume after a successful login.
    pub return_url: Option<String>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            return_url: None,
        }
    }

    pub fn login() -> Self {
        Self::to(LOGIN_PATH)
    }

    pub fn login_resuming(requested: &str) -> Self {
        Self {
            path: LOGIN_PATH.to_string(),
            return_url: Some(requested.to_string()),
        }
    }

    /// The redirect as a URL path, with `returnUrl` as a query parameter.
    pub fn href(&self) -> String {
        match &self.return_url {
            Some(url) => {
                let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
                format!("{}?returnUrl={encoded}", self.path)
            }
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Redirect),
}

impl Guard {
    /// Decide whether `session` may enter `requested`.
    ///
    /// Admin-only routes always remember the requested path so login can
    /// resume there; plain authenticated routes send the user to login.
    pub fn check(self, session: &Session, requested: &str) -> GuardDecision {
        match self {
            Guard::Public => GuardDecision::Allow,
            Guard::Authenticated if session.is_authenticated() => GuardDecision::Allow,
            Guard::Authenticated => GuardDecision::Redirect(Redirect::login()),
            Guard::Admin if session.is_admin() => GuardDecision::Allow,
            Guard::Admin => {
                tracing::info!(path = requested, "admin route denied, redirecting to login");
                GuardDecision::Redirect(Redirect::login_resuming(requested))
            }
        }
    }
}

/// First screen after login: admins manage professionals, everyone else
/// lands on the therapy sessions.
pub fn landing_path(profile: &UserProfile) -> &'static str {
    if profile.has_role(ROLE_ADMIN) {
        ADMIN_LANDING
    } else {
        STAFF_LANDING
    }
}
