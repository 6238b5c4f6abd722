use std::sync::Arc;

use tokio::sync::watch;

use terapia_api::{AuthApi, TokenProvider};
use terapia_core::models::auth::LoginRequest;
use terapia_storage::kv::KeyValueStore;
use terapia_storage::state::{encode_state, load_state};

use crate::error::{AuthError, INVALID_CREDENTIALS};
use crate::guard::{Redirect, landing_path};
use crate::session::Session;

/// Slot holding the opaque bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// Slot holding the JSON user profile.
pub const USER_KEY: &str = "auth_user";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    /// Role-based first screen.
    pub landing: &'static str,
}

/// Owns the console session: persisted slots plus a published copy that
/// observers (navigation, API client) read without touching storage.
pub struct SessionGate {
    auth: AuthApi,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<Session>,
}

impl SessionGate {
    /// Build the gate, restoring any session persisted by a previous run.
    pub fn new(auth: AuthApi, store: Arc<dyn KeyValueStore>) -> Self {
        let restored = restore(store.as_ref());
        if restored.is_authenticated() {
            tracing::info!(user = restored.display_name(), "restored persisted session");
        }
        let (state, _) = watch::channel(restored);
        Self { auth, store, state }
    }

    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Observe session changes (login, logout).
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.state.borrow().has_role(role)
    }

    /// Send credentials; on success persist token and profile together and
    /// publish the new session. Nothing is persisted on failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = match self.auth.login(&request).await {
            Ok(response) => response,
            Err(e @ terapia_api::ApiError::Connectivity(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(username, error = %e, "login rejected");
                let message = e.backend_message().unwrap_or(INVALID_CREDENTIALS);
                return Err(AuthError::InvalidCredentials(message.to_string()));
            }
        };

        let (token, profile) = response.into_parts();
        let profile_json = encode_state(&profile)?;
        self.store.write_batch(&[
            (TOKEN_KEY, Some(token.as_str())),
            (USER_KEY, Some(profile_json.as_str())),
        ])?;

        let landing = landing_path(&profile);
        let session = Session {
            token: Some(token),
            profile: Some(profile),
        };
        self.state.send_replace(session.clone());

        tracing::info!(
            user = session.display_name(),
            admin = session.is_admin(),
            "login succeeded"
        );
        Ok(LoginOutcome { session, landing })
    }

    /// Clear both slots, publish the anonymous session, and send the user
    /// back to the login screen.
    pub fn logout(&self) -> Redirect {
        if let Err(e) = self
            .store
            .write_batch(&[(TOKEN_KEY, None), (USER_KEY, None)])
        {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        self.state.send_replace(Session::anonymous());
        tracing::info!("logged out");
        Redirect::login()
    }
}

impl TokenProvider for SessionGate {
    fn bearer_token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }
}

fn restore(store: &dyn KeyValueStore) -> Session {
    let token = match store.get(TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read persisted token");
            None
        }
    };

    let profile = match load_state(store, USER_KEY) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable persisted profile");
            None
        }
    };

    Session { token, profile }
}
