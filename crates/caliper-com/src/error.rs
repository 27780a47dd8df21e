use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum ComError {
    InvalidUri(String),
    UnsupportedScheme(String),
    /// Connection, protocol or body errors from the HTTP client.
    Http(reqwest::Error),
    PayloadTooLarge { size: usize, limit: usize },
    Status(http::StatusCode),
    Json(serde_json::Error),
    InvalidResponse(String),
    Timeout(Duration),
}

impl fmt::Display for ComError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComError::InvalidUri(msg) => write!(f, "invalid URL: {msg}"),
            ComError::UnsupportedScheme(scheme) => write!(f, "unsupported URL scheme: {scheme}"),
            ComError::Http(err) => write!(f, "http error: {err}"),
            ComError::PayloadTooLarge { size, limit } => {
                write!(f, "payload too large: {size} bytes (limit {limit})")
            }
            ComError::Status(status) => write!(f, "server responded with {status}"),
            ComError::Json(err) => write!(f, "json error: {err}"),
            ComError::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
            ComError::Timeout(limit) => write!(f, "request timed out after {:.1}s", limit.as_secs_f64()),
        }
    }
}

impl std::error::Error for ComError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComError::Http(err) => Some(err),
            ComError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ComError {
    fn from(err: reqwest::Error) -> Self {
        ComError::Http(err)
    }
}

impl From<serde_json::Error> for ComError {
    fn from(err: serde_json::Error) -> Self {
        ComError::Json(err)
    }
}
