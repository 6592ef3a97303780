use thiserror::Error;

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Invalid GitHub URL")]
    InvalidUrl(String),

    #[error("GitHub API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Repository not found or private.")]
    NotFound,

    #[error("Failed to fetch file tree: {0}")]
    Status(String),

    #[error("Invalid base URL: {0}")]
    BaseUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GithubError {
    /// Upstream failures the caller cannot fix by changing its input.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Status(_) | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, GithubError>;
