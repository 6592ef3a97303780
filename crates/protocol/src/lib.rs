//! # RepoLens Protocol
//!
//! Data model and request/response envelopes shared between the analysis
//! pipeline, the HTTP service, the CLI and the session store.
//!
//! Everything here is a plain value: analysis results are built once per
//! request and owned by whoever asked for them.

mod analysis;
mod explain;
mod graph;
mod http;
mod repo;
mod tree;

pub use analysis::{RepoAnalysis, TechStack};
pub use explain::{
    ArchitectureContext, ExperienceLevel, ExplainKind, ExplainRequest, ExplainTarget,
    FileContext, FolderContext,
};
pub use graph::{DependencyNode, GraphEdge, MatchRule, NodePosition};
pub use http::{
    AnalyzeRequest, ErrorBody, FileContentRequest, FileContentResponse, HealthResponse,
};
pub use repo::RepoId;
pub use tree::{EntryKind, FileNode, FileTreeEntry, NodeKind};
