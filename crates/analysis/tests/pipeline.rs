//! End-to-end analysis against an in-memory repository

use async_trait::async_trait;
use repolens_analysis::{match_edges, RepoAnalyzer, RepoListing, RepoSource};
use repolens_protocol::{FileTreeEntry, MatchRule, RepoId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct FakeError(String);

struct MemorySource {
    entries: Vec<FileTreeEntry>,
    files: HashMap<String, String>,
    fail_listing: bool,
    fetches: AtomicUsize,
}

impl MemorySource {
    fn new(files: &[(&str, &str)]) -> Self {
        Self {
            entries: files
                .iter()
                .map(|(path, body)| FileTreeEntry::blob(*path, Some(body.len() as u64)))
                .collect(),
            files: files
                .iter()
                .map(|(path, body)| ((*path).to_string(), (*body).to_string()))
                .collect(),
            fail_listing: false,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RepoSource for MemorySource {
    type Error = FakeError;

    async fn list_tree(&self, _repo: &RepoId) -> Result<RepoListing, FakeError> {
        if self.fail_listing {
            return Err(FakeError("Repository not found or private.".into()));
        }
        Ok(RepoListing {
            entries: self.entries.clone(),
            truncated: false,
        })
    }

    async fn fetch_content(&self, _repo: &RepoId, path: &str) -> Result<String, FakeError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FakeError(format!("missing {path}")))
    }
}

fn sample_repo() -> MemorySource {
    MemorySource::new(&[
        ("README.md", "# Demo"),
        ("package.json", r#"{"name":"demo"}"#),
        ("next.config.js", "module.exports = {}"),
        ("src/a.ts", "import { b } from './b';\nexport const a = b;"),
        ("src/b.ts", "export const b = 1;"),
        ("src/c.ts", "import _ from 'lodash';"),
        ("src/c.test.ts", "import { a } from './a';"),
    ])
}

#[tokio::test]
async fn test_analyze_small_repo() {
    let source = sample_repo();
    let analysis = RepoAnalyzer::new(&source)
        .analyze(&RepoId::new("acme", "demo"))
        .await
        .unwrap();

    assert_eq!(analysis.total_files, 7);
    assert_eq!(analysis.readme_content.as_deref(), Some("# Demo"));
    assert_eq!(analysis.package_json_content.as_deref(), Some(r#"{"name":"demo"}"#));
    assert_eq!(analysis.tech_stack.frameworks, vec!["Next.js"]);
    assert_eq!(
        analysis.summary,
        "Analyzed 7 files. Detected Next.js."
    );

    let ids: Vec<&str> = analysis.dependency_graph.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["src/a.ts", "src/b.ts", "src/c.ts"]);
    assert_eq!(analysis.dependency_graph[0].imports, vec!["src/b"]);
    assert_eq!(analysis.dependency_graph[2].imports, vec!["lodash"]);

    let edges = match_edges(&analysis.dependency_graph);
    assert_eq!(edges.len(), 1);
    assert!(edges.contains("src/a.ts", "src/b.ts"));
    assert_eq!(edges.edges()[0].rule, MatchRule::Suffix);
}

#[tokio::test]
async fn test_missing_readme_and_manifest_are_absent() {
    let source = MemorySource::new(&[("index.js", "require('./x')")]);
    let analysis = RepoAnalyzer::new(&source)
        .analyze(&RepoId::new("acme", "tiny"))
        .await
        .unwrap();

    assert!(analysis.readme_content.is_none());
    assert!(analysis.package_json_content.is_none());
    assert_eq!(analysis.summary, "Analyzed 1 files. Detected no known frameworks.");
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_content_fetch_degrades_to_empty() {
    let mut source = MemorySource::new(&[("Readme.md", "hi"), ("src/a.ts", "import './b';")]);
    source.files.clear();

    let analysis = RepoAnalyzer::new(&source)
        .analyze(&RepoId::new("acme", "flaky"))
        .await
        .unwrap();

    assert_eq!(analysis.readme_content.as_deref(), Some(""));
    assert_eq!(analysis.dependency_graph.len(), 1);
    assert!(analysis.dependency_graph[0].imports.is_empty());
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let mut source = sample_repo();
    source.fail_listing = true;

    let err = RepoAnalyzer::new(&source)
        .analyze(&RepoId::new("acme", "gone"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Repository not found or private.");
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
}
