use crate::imports::ImportExtractor;
use crate::resolve::{is_relative_specifier, resolve_import_path};
use crate::tech_stack::detect_tech_stack_from_entries;
use crate::tree::TreeBuilder;
use async_trait::async_trait;
use futures::future::join_all;
use repolens_protocol::{DependencyNode, FileTreeEntry, RepoAnalysis, RepoId, TechStack};

pub const DEFAULT_MAX_SOURCE_FILES: usize = 20;

const SAMPLED_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];
const EXCLUDED_PATTERNS: &[&str] = &[".d.ts", ".test.", ".spec."];

/// Flat listing of a repository snapshot.
#[derive(Debug, Clone, Default)]
pub struct RepoListing {
    pub entries: Vec<FileTreeEntry>,
    /// The host reported that entries were omitted.
    pub truncated: bool,
}

/// Where listings and file contents come from.
#[async_trait]
pub trait RepoSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn list_tree(&self, repo: &RepoId) -> Result<RepoListing, Self::Error>;

    async fn fetch_content(&self, repo: &RepoId, path: &str) -> Result<String, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub max_source_files: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_source_files: DEFAULT_MAX_SOURCE_FILES,
        }
    }
}

/// True for script files that are worth sampling into the graph:
/// no declaration files, no tests or specs.
#[must_use]
pub fn is_sampled_source(path: &str) -> bool {
    SAMPLED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        && !EXCLUDED_PATTERNS.iter().any(|pattern| path.contains(pattern))
}

/// Turns fetched source files into graph nodes.
pub struct DependencyGraphAssembler {
    config: AssemblerConfig,
    tree: TreeBuilder,
}

impl DependencyGraphAssembler {
    #[must_use]
    pub fn new(config: AssemblerConfig, tree: TreeBuilder) -> Self {
        Self { config, tree }
    }

    /// Bounded, listing-ordered sample of source blobs.
    #[must_use]
    pub fn sample<'a>(&self, entries: &'a [FileTreeEntry]) -> Vec<&'a FileTreeEntry> {
        entries
            .iter()
            .filter(|e| e.is_blob() && is_sampled_source(&e.path) && !self.tree.is_ignored(&e.path))
            .take(self.config.max_source_files)
            .collect()
    }

    /// Extract and resolve imports for every file, preserving input order.
    #[must_use]
    pub fn assemble(&self, files: &[SourceFile]) -> Vec<DependencyNode> {
        let mut extractor = match ImportExtractor::new() {
            Ok(extractor) => Some(extractor),
            Err(err) => {
                log::warn!("Import extraction unavailable: {err}");
                None
            }
        };

        files
            .iter()
            .map(|file| {
                let raw = extractor
                    .as_mut()
                    .map(|ex| ex.extract(&file.path, &file.content))
                    .unwrap_or_default();
                let imports = raw
                    .into_iter()
                    .map(|spec| resolve_or_keep(&file.path, spec))
                    .collect();
                DependencyNode::new(file.path.clone(), imports)
            })
            .collect()
    }
}

impl Default for DependencyGraphAssembler {
    fn default() -> Self {
        Self::new(AssemblerConfig::default(), TreeBuilder::default())
    }
}

fn resolve_or_keep(importer: &str, specifier: String) -> String {
    if !is_relative_specifier(&specifier) {
        return specifier;
    }
    match resolve_import_path(importer, &specifier) {
        Ok(resolved) => resolved,
        Err(err) => {
            log::debug!("{err}");
            specifier
        }
    }
}

/// Runs the whole analysis for one repository against a [`RepoSource`].
pub struct RepoAnalyzer<'a, S: RepoSource> {
    source: &'a S,
    assembler: DependencyGraphAssembler,
    tree: TreeBuilder,
}

impl<'a, S: RepoSource> RepoAnalyzer<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, AssemblerConfig::default(), TreeBuilder::default())
    }

    pub fn with_config(source: &'a S, config: AssemblerConfig, tree: TreeBuilder) -> Self {
        Self {
            source,
            assembler: DependencyGraphAssembler::new(config, tree.clone()),
            tree,
        }
    }

    /// Listing failures are fatal; content failures only blank that file.
    pub async fn analyze(&self, repo: &RepoId) -> Result<RepoAnalysis, S::Error> {
        let listing = self.source.list_tree(repo).await?;
        let entries = &listing.entries;

        let file_tree = self.tree.build(entries);
        let tech_stack = detect_tech_stack_from_entries(entries);

        let readme = entries
            .iter()
            .find(|e| e.path.eq_ignore_ascii_case("readme.md"));
        let manifest = entries
            .iter()
            .find(|e| e.path.eq_ignore_ascii_case("package.json"));
        let sampled = self.assembler.sample(entries);

        let readme_fut = async {
            match readme {
                Some(entry) => Some(self.fetch_or_empty(repo, &entry.path).await),
                None => None,
            }
        };
        let manifest_fut = async {
            match manifest {
                Some(entry) => Some(self.fetch_or_empty(repo, &entry.path).await),
                None => None,
            }
        };
        let sources_fut = join_all(sampled.iter().map(|entry| async move {
            SourceFile {
                path: entry.path.clone(),
                content: self.fetch_or_empty(repo, &entry.path).await,
            }
        }));

        let (readme_content, package_json_content, sources) =
            futures::join!(readme_fut, manifest_fut, sources_fut);

        let dependency_graph = self.assembler.assemble(&sources);
        log::info!(
            "Analyzed {repo}: {} listing entries, {} graph nodes",
            entries.len(),
            dependency_graph.len()
        );

        Ok(RepoAnalysis {
            summary: summarize(entries.len(), &tech_stack),
            file_tree,
            dependency_graph,
            tech_stack,
            readme_content,
            package_json_content,
            total_files: entries.len(),
            truncated: listing.truncated,
        })
    }

    async fn fetch_or_empty(&self, repo: &RepoId, path: &str) -> String {
        match self.source.fetch_content(repo, path).await {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Failed to fetch {path} from {repo}: {err}");
                String::new()
            }
        }
    }
}

/// One-line human-readable summary of an analysis.
#[must_use]
pub fn summarize(total_files: usize, stack: &TechStack) -> String {
    if stack.frameworks.is_empty() {
        format!("Analyzed {total_files} files. Detected no known frameworks.")
    } else {
        format!(
            "Analyzed {total_files} files. Detected {}.",
            stack.frameworks.join(", ")
        )
    }
}
