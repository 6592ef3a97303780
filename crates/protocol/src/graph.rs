use serde::{Deserialize, Serialize};

/// A sampled source file and the imports found in it.
///
/// `imports` holds resolved repo-relative paths for relative specifiers and
/// the verbatim specifier otherwise. Entries may point at files that are not
/// part of the graph (external packages, unsampled or missing files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub imports: Vec<String>,
}

impl DependencyNode {
    pub fn new(path: impl Into<String>, imports: Vec<String>) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            path,
            imports,
        }
    }

    /// Final path segment, used as the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Which matching rule produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Exact,
    Suffix,
    Basename,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub rule: MatchRule,
    /// Set when the basename rule had several candidate targets and picked the first.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ambiguous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}
