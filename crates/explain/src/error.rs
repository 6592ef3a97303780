use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplainError {
    #[error("API Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed stream event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid explain context: {0}")]
    InvalidContext(String),
}

pub type Result<T> = std::result::Result<T, ExplainError>;
