use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History file is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No data directory available for history")]
    NoDataDir,

    #[error("No analysis loaded")]
    NoAnalysis,

    #[error("Path not found in file tree: {0}")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
