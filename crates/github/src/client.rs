use crate::error::{GithubError, Result};
use async_trait::async_trait;
use repolens_analysis::{RepoListing, RepoSource};
use repolens_protocol::{FileTreeEntry, RepoId};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

const ACCEPT_V3: &str = "application/vnd.github.v3+json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base_url: String,
    pub raw_base_url: String,
    /// Sent as `Authorization: token …` when present and non-blank.
    pub token: Option<String>,
    pub user_agent: String,
    /// Ref used for both listing and raw content.
    pub git_ref: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            token: None,
            user_agent: format!("repolens/{}", env!("CARGO_PKG_VERSION")),
            git_ref: "HEAD".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<FileTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Read-only client for public repository snapshots.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    fn token(&self) -> Option<&str> {
        self.config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    fn tree_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.config.api_base_url.trim_end_matches('/'),
            repo.owner,
            repo.repo,
            self.config.git_ref
        )
    }

    /// Each path segment is percent-encoded, so `#`, `?` and spaces stay
    /// part of the file name.
    fn raw_url(&self, repo: &RepoId, path: &str) -> Result<Url> {
        let base = self.config.raw_base_url.trim_end_matches('/');
        let mut url =
            Url::parse(base).map_err(|err| GithubError::BaseUrl(format!("{base}: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| GithubError::BaseUrl(base.to_string()))?
            .pop_if_empty()
            .push(&repo.owner)
            .push(&repo.repo)
            .push(&self.config.git_ref)
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Recursive listing of every entry at the configured ref.
    pub async fn list_tree(&self, repo: &RepoId) -> Result<RepoListing> {
        let mut request = self
            .http
            .get(self.tree_url(repo))
            .header(ACCEPT, ACCEPT_V3);
        if let Some(token) = self.token() {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            log::debug!("Listing {repo} failed with {status}");
            return Err(match status {
                StatusCode::FORBIDDEN => GithubError::RateLimited,
                StatusCode::NOT_FOUND => GithubError::NotFound,
                other => GithubError::Status(
                    other
                        .canonical_reason()
                        .map_or_else(|| other.as_str().to_string(), str::to_string),
                ),
            });
        }

        let body: TreeResponse = response.json().await?;
        if body.truncated {
            log::warn!("Tree for {repo} is truncated. Some files might be missing.");
        }
        log::debug!("Listed {} entries for {repo}", body.tree.len());

        Ok(RepoListing {
            entries: body.tree,
            truncated: body.truncated,
        })
    }

    /// Raw file text. A non-success status yields an empty string; only
    /// transport failures are errors.
    pub async fn fetch_content(&self, repo: &RepoId, path: &str) -> Result<String> {
        let response = self.http.get(self.raw_url(repo, path)?).send().await?;
        if !response.status().is_success() {
            log::debug!("Raw fetch of {path} in {repo} returned {}", response.status());
            return Ok(String::new());
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    type Error = GithubError;

    async fn list_tree(&self, repo: &RepoId) -> Result<RepoListing> {
        GithubClient::list_tree(self, repo).await
    }

    async fn fetch_content(&self, repo: &RepoId, path: &str) -> Result<String> {
        GithubClient::fetch_content(self, repo, path).await
    }
}
