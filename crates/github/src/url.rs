use crate::error::{GithubError, Result};
use repolens_protocol::RepoId;
use reqwest::Url;

const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Extract `owner/repo` from a repository URL.
///
/// Accepts anything under a GitHub host with at least two path segments
/// (`https://github.com/o/r/tree/main/src` is `o/r`). A missing scheme is
/// tolerated and a trailing `.git` is stripped from the repository name.
pub fn parse_github_url(input: &str) -> Result<RepoId> {
    let input = input.trim();
    let invalid = || GithubError::InvalidUrl(input.to_string());

    let url = match Url::parse(input) {
        Ok(url) if url.has_host() => url,
        _ => Url::parse(&format!("https://{input}")).map_err(|_| invalid())?,
    };

    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
    if !GITHUB_HOSTS.contains(&host.as_str()) {
        return Err(invalid());
    }

    let mut segments = url.path().split('/').filter(|s| !s.is_empty());
    let owner = segments.next().ok_or_else(invalid)?;
    let repo = segments.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoId::new(owner, repo))
}
