use thiserror::Error;

pub const SIGN_IN_AGAIN: &str =
    "You do not have permission for this action. Please sign in again.";

pub const CANNOT_REACH_SERVER: &str =
    "Cannot reach the server. Check that the backend is running.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authorized (HTTP {status}){}", suffix(.message))]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },

    #[error("cannot reach server: {0}")]
    Connectivity(String),

    #[error("not found{}", suffix(.message))]
    NotFound { message: Option<String> },

    #[error("backend error (HTTP {status}){}", suffix(.message))]
    Backend {
        status: u16,
        message: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Classify a non-2xx response.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized {
                status,
                message: extract_message(body),
            },
            404 => ApiError::NotFound {
                message: extract_message(body),
            },
            _ => ApiError::Backend {
                status,
                message: extract_message(body),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Backend { status, .. } => {
                Some(*status)
            }
            ApiError::NotFound { .. } => Some(404),
            ApiError::Connectivity(_) | ApiError::Decode(_) => None,
        }
    }

    /// The explanation the backend put in the error body, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message, .. }
            | ApiError::NotFound { message }
            | ApiError::Backend { message, .. } => message.as_deref(),
            ApiError::Connectivity(_) | ApiError::Decode(_) => None,
        }
    }

    /// The string shown to the user for this failure.
    ///
    /// `fallback` is the per-operation message used when the backend gave no
    /// usable explanation.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized { .. } => SIGN_IN_AGAIN.to_string(),
            ApiError::Connectivity(_) => CANNOT_REACH_SERVER.to_string(),
            ApiError::NotFound { message } | ApiError::Backend { message, .. } => message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
            ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

impl From<crate::transport::TransportError> for ApiError {
    fn from(e: crate::transport::TransportError) -> Self {
        ApiError::Connectivity(e.0)
    }
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Pull the human-readable message out of an error body.
///
/// Looks at `mensaje`, then `error`, then `message`; blank strings and
/// non-string values are skipped.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["mensaje", "error", "message"].iter().find_map(|field| {
        value
            .get(*field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
