//! JSON-over-HTTP surface.

mod error;
mod handlers;

pub use error::{internal_error, invalid_request, not_found, rate_limited, upstream, ApiError};

use crate::config::{AnalysisConfig, AppConfig};
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use repolens_explain::Explainer;
use repolens_github::GithubClient;
use std::sync::Arc;

/// Shared per-process services. Requests hold no state of their own.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    github: GithubClient,
    explainer: Explainer,
    analysis: AnalysisConfig,
}

impl AppState {
    pub fn new(github: GithubClient, explainer: Explainer, analysis: AnalysisConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                github,
                explainer,
                analysis,
            }),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let github =
            GithubClient::new(config.github.clone()).context("Failed to build GitHub client")?;
        let explainer =
            Explainer::from_config(&config.explain).context("Failed to build model providers")?;
        let names = explainer.provider_names();
        if names.is_empty() {
            log::warn!("No model provider configured, explanations use mock mode");
        } else {
            log::info!("Model providers: {}", names.join(", "));
        }
        Ok(Self::new(github, explainer, config.analysis.clone()))
    }

    pub(crate) fn github(&self) -> &GithubClient {
        &self.inner.github
    }

    pub(crate) fn explainer(&self) -> &Explainer {
        &self.inner.explainer
    }

    pub(crate) fn analysis(&self) -> &AnalysisConfig {
        &self.inner.analysis
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/explain", post(handlers::explain))
        .route("/api/file", post(handlers::file_content))
        .route("/api/health", get(handlers::health))
        .with_state(state)
}
