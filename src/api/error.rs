use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("Content API error {code}: {status}")]
    Remote { code: u16, status: String },

    #[error("Unexpected response format: {0}")]
    Malformed(String),

    #[error("Invalid reference {0}")]
    InvalidReference(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
