//! Terminal commands.

mod analyze;
mod explain;
mod history;
mod serve;

pub use analyze::render_report;
pub use explain::resolve_content;

use crate::config::AppConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repolens_analysis::RepoAnalyzer;
use repolens_github::{parse_github_url, GithubClient};
use repolens_protocol::{ExperienceLevel, ExplainTarget};
use repolens_session::{HistoryStore, RecentHistory, Session};
use std::path::PathBuf;

/// RepoLens - explain a GitHub repository's structure and code
#[derive(Debug, Parser)]
#[command(name = "repolens", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long)]
        bind: Option<String>,
    },
    /// Analyze a repository and print its structure
    Analyze {
        url: String,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stream an explanation of a repository, folder or file
    Explain {
        url: String,
        /// Audience level: junior, mid or senior
        #[arg(long, default_value = "mid")]
        level: ExperienceLevel,
        /// Folder or file to explain instead of the whole architecture
        #[arg(long)]
        path: Option<String>,
    },
    /// Show or clear recently analyzed repositories
    History {
        #[arg(long)]
        clear: bool,
    },
}

impl Commands {
    /// Default log filter when `RUST_LOG` is unset.
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Serve { .. } => "info",
            _ => "warn",
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve { bind } => serve::run(config, bind).await,
        Commands::Analyze { url, json } => analyze::run(config, &url, json).await,
        Commands::Explain { url, level, path } => {
            explain::run(config, &url, level, path.as_deref()).await
        }
        Commands::History { clear } => history::run(&config, clear),
    }
}

/// Session seeded from the persisted history. A corrupt file starts empty.
fn open_session(store: &HistoryStore) -> Session {
    let history = store.load().unwrap_or_else(|err| {
        log::warn!("Ignoring history at {}: {err}", store.path().display());
        RecentHistory::new()
    });
    Session::new(history)
}

/// Analyze `url` into `session`, persisting the updated history.
/// Returns the architecture explanation target.
async fn load_repository(
    config: &AppConfig,
    client: &GithubClient,
    session: &mut Session,
    store: &HistoryStore,
    url: &str,
) -> Result<ExplainTarget> {
    let repo = parse_github_url(url)?;
    let id = session.start_analysis(url);
    if let Err(err) = store.save(session.history()) {
        log::warn!("Failed to save history: {err}");
    }

    let analyzer = RepoAnalyzer::with_config(
        client,
        config.analysis.assembler(),
        config.analysis.tree_builder(),
    );
    match analyzer.analyze(&repo).await {
        Ok(analysis) => session
            .receive_analysis(id, analysis)
            .context("Analysis was superseded by a newer request"),
        Err(err) => {
            session.fail_analysis(id, err.to_string());
            Err(err.into())
        }
    }
}
