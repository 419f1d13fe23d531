use axum::http::StatusCode;
use std::fmt;

/// Failure talking to the habit backend or writing the local store.
#[derive(Debug)]
pub enum ClientError {
    Transport(reqwest::Error),
    Status { status: reqwest::StatusCode, body: String },
    Decode(serde_json::Error),
    InvalidDate(String),
    Storage(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(err) => write!(f, "request failed: {err}"),
            ClientError::Status { status, .. } => {
                let reason = status.canonical_reason().unwrap_or("");
                write!(f, "Server responded with {}: {}", status.as_u16(), reason)
            }
            ClientError::Decode(err) => write!(f, "invalid response body: {err}"),
            ClientError::InvalidDate(raw) => write!(f, "invalid date from server: {raw:?}"),
            ClientError::Storage(err) => write!(f, "local store: {err}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport(err) => Some(err),
            ClientError::Decode(err) => Some(err),
            ClientError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err)
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
