//! # RepoLens service and CLI
//!
//! The HTTP surface (`/api/analyze`, `/api/explain`, `/api/file`,
//! `/api/health`) and the terminal commands share one [`config::AppConfig`]
//! and the same GitHub client and explainer.

pub mod command;
pub mod config;
pub mod http;

pub use config::AppConfig;
pub use http::{router, AppState};
