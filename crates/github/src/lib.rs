//! # RepoLens GitHub
//!
//! Fetches repository snapshots from GitHub: the recursive tree listing
//! through the REST API and file bodies through the raw content host.
//! [`GithubClient`] implements [`repolens_analysis::RepoSource`].

mod client;
mod error;
mod url;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_BASE_URL, DEFAULT_RAW_BASE_URL};
pub use error::{GithubError, Result};
pub use url::parse_github_url;
