use crate::{DependencyNode, FileNode};
use serde::{Deserialize, Serialize};

/// Detected technologies, each list deduplicated in detection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStack {
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl TechStack {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty() && self.languages.is_empty() && self.tools.is_empty()
    }
}

/// Full result of analyzing one repository snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoAnalysis {
    pub file_tree: Vec<FileNode>,
    pub dependency_graph: Vec<DependencyNode>,
    pub tech_stack: TechStack,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_json_content: Option<String>,
    /// Number of entries in the flat listing, before ignore filtering.
    #[serde(default)]
    pub total_files: usize,
    /// The hosted listing reported that it omitted entries.
    #[serde(default)]
    pub truncated: bool,
}
