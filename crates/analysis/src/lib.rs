//! # RepoLens Analysis
//!
//! Static, best-effort analysis of a repository snapshot.
//!
//! ## Pipeline
//!
//! ```text
//! Flat listing (FileTreeEntry[])
//!     │
//!     ├──> Tree Builder ─────────> FileNode[] (ignore-filtered, dirs first)
//!     ├──> Tech Stack Detector ──> frameworks / languages / tools
//!     │
//!     └──> Graph Assembler (bounded sample, concurrent fetch)
//!            ├─ Import Extractor (tree-sitter JS/TS/TSX)
//!            ├─ Import Path Resolver (relative -> repo-root path)
//!            └─> DependencyNode[]
//!                   │
//!                   └──> Edge Matcher (exact / suffix / basename) ──> edges + layout
//! ```
//!
//! Nothing here checks resolved paths against the real tree. The edge matcher
//! reconciles them heuristically, so edges can be missing or, for the basename
//! rule, wrong.

mod assembler;
mod edges;
mod error;
mod imports;
mod language;
mod resolve;
mod tech_stack;
mod tree;

pub use assembler::{
    is_sampled_source, summarize, AssemblerConfig, DependencyGraphAssembler, RepoAnalyzer,
    RepoListing, RepoSource, SourceFile, DEFAULT_MAX_SOURCE_FILES,
};
pub use edges::{circular_layout, match_edges, EdgeMatch, EdgeMatcher, EdgeSet, RESOLVABLE_SUFFIXES};
pub use error::{AnalysisError, Result};
pub use imports::{extract_imports, ImportExtractor};
pub use language::ScriptDialect;
pub use resolve::{is_relative_specifier, resolve_import_path};
pub use tech_stack::{detect_tech_stack, detect_tech_stack_from_entries};
pub use tree::{build_file_tree, TreeBuilder, IGNORED_PATHS};
