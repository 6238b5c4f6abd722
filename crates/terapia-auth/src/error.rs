use thiserror::Error;

use terapia_api::ApiError;
use terapia_storage::error::StorageError;

pub const MISSING_CREDENTIALS: &str = "Please fill in all fields";

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password are required")]
    MissingCredentials,

    #[error("authentication failed: {0}")]
    InvalidCredentials(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingCredentials => MISSING_CREDENTIALS.to_string(),
            AuthError::InvalidCredentials(msg) => msg.clone(),
            AuthError::Api(e) => e.user_message(INVALID_CREDENTIALS),
            AuthError::Storage(e) => format!("Could not save the session: {e}"),
        }
    }
}
