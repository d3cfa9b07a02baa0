use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - token missing, expired or rejected")]
    Unauthorized,

    /// 400 and 422; holds the server's `detail`, empty when it sent none
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }

    /// Pull the human-readable `detail` out of an error body.
    ///
    /// Plain errors carry `{"detail": "..."}`; request validation failures
    /// carry a list of `{"msg": "..."}` objects instead.
    pub fn extract_detail(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            _ => None,
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = || Self::extract_detail(body).unwrap_or_default();
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            400 | 422 => ApiError::BadRequest(detail()),
            403 => ApiError::AccessDenied(detail()),
            404 => ApiError::NotFound(detail()),
            500..=599 => ApiError::ServerError(Self::truncate_body(body)),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// The server's `detail` for client errors, when it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest(d) | ApiError::AccessDenied(d) | ApiError::NotFound(d)
                if !d.is_empty() =>
            {
                Some(d.as_str())
            }
            _ => None,
        }
    }

    /// Text to show the user when `action` (e.g. "create event") failed.
    pub fn user_message(&self, action: &str) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        match self {
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::BadRequest(_) => format!("Could not {}: the request was invalid.", action),
            ApiError::AccessDenied(_) => format!("You are not allowed to {}.", action),
            ApiError::NotFound(_) => format!("Could not {}: it no longer exists.", action),
            ApiError::Network(_) => {
                format!("Could not {}: the server is unreachable.", action)
            }
            ApiError::Storage(_) => {
                format!("Could not {}: the session could not be saved.", action)
            }
            ApiError::ServerError(_) | ApiError::InvalidResponse(_) => {
                format!("Failed to {}. Please try again.", action)
            }
        }
    }
}
