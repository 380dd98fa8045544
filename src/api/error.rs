use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("authentication failed")]
    Auth,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("timed out after {0} seconds waiting for project update {1} to finish")]
    Timeout(u64, i64),
}
