use anyhow::{Context, Result};
use repolens_analysis::{AssemblerConfig, TreeBuilder, DEFAULT_MAX_SOURCE_FILES};
use repolens_explain::ExplainConfig;
use repolens_github::GithubConfig;
use repolens_session::HistoryStore;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const LOCAL_CONFIG_FILE: &str = "repolens.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub github: GithubConfig,
    pub analysis: AnalysisConfig,
    pub explain: ExplainConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_source_files: usize,
    /// Added to the built-in ignore set.
    pub extra_ignored: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_source_files: DEFAULT_MAX_SOURCE_FILES,
            extra_ignored: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn assembler(&self) -> AssemblerConfig {
        AssemblerConfig {
            max_source_files: self.max_source_files,
        }
    }

    #[must_use]
    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::new().with_ignored(self.extra_ignored.iter().cloned())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: Option<PathBuf>,
}

impl HistoryConfig {
    pub fn store(&self) -> Result<HistoryStore> {
        match &self.path {
            Some(path) => Ok(HistoryStore::new(path.clone())),
            None => HistoryStore::default_location().context("Failed to locate history file"),
        }
    }
}

impl AppConfig {
    /// Load `explicit`, else `./repolens.toml`, else the user config file,
    /// else defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_candidates().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from `lookup`; blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(url) = get("GITHUB_API_BASE_URL") {
            self.github.api_base_url = url;
        }
        if let Some(url) = get("GITHUB_RAW_BASE_URL") {
            self.github.raw_base_url = url;
        }
        if let Some(key) = get("GOOGLE_GENERATIVE_AI_API_KEY") {
            self.explain.gemini_api_key = Some(key);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.explain.openai_api_key = Some(key);
        }
        if let Some(bind) = get("REPOLENS_BIND") {
            self.server.bind = bind;
        }
    }
}

fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("repolens").join("config.toml"));
    }
    candidates
}
