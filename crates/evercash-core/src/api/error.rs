use serde_json::Value;
use thiserror::Error;

/// Every failure a consumer of the operation set can observe.
///
/// `Clone` so one failure can be handed to every caller that was coalesced
/// onto the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("API error ({status}): {}", display_body(.body))]
    Status { status: u16, body: Value },

    #[error("Demo mode: {action} are disabled")]
    DemoModeBlocked { action: String },

    #[error("Not connected: {0}")]
    Initialization(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn display_body(body: &Value) -> String {
    ApiError::truncate_body(&body.to_string())
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build a status error from a raw response body.
    /// Bodies that are not JSON are wrapped as `{"message": <text>}`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = serde_json::from_str(body)
            .unwrap_or_else(|_| serde_json::json!({ "message": body }));
        ApiError::Status { status, body }
    }

    pub fn demo_blocked(action: impl Into<String>) -> Self {
        ApiError::DemoModeBlocked {
            action: action.into(),
        }
    }

    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_demo_blocked(&self) -> bool {
        matches!(self, ApiError::DemoModeBlocked { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
