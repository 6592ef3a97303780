use serde::{Deserialize, Serialize};

/// Kind of a flat listing entry as reported by the hosted tree API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule pointers and anything else the listing may report.
    #[serde(other)]
    Other,
}

/// One row of the recursive repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl FileTreeEntry {
    pub fn blob(path: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            size,
            mode: None,
            sha: None,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
            size: None,
            mode: None,
            sha: None,
        }
    }

    #[must_use]
    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// Node of the hierarchical file tree.
///
/// Serialized as `{ "path", "name", "type": "file" | "dir", "size"?, "children"? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
    Dir {
        #[serde(default)]
        children: Vec<FileNode>,
    },
}

impl FileNode {
    pub fn file(path: impl Into<String>, name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: NodeKind::File { size },
        }
    }

    pub fn dir(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: NodeKind::Dir {
                children: Vec::new(),
            },
        }
    }

    /// Directory node holding `children`.
    #[must_use]
    pub fn with_children(path: impl Into<String>, name: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: NodeKind::Dir { children },
        }
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir { .. })
    }

    /// Children of a directory; always empty for files.
    #[must_use]
    pub fn children(&self) -> &[FileNode] {
        match &self.kind {
            NodeKind::Dir { children } => children.as_slice(),
            NodeKind::File { .. } => &[],
        }
    }

    #[must_use]
    pub fn size(&self) -> Option<u64> {
        match &self.kind {
            NodeKind::File { size } => *size,
            NodeKind::Dir { .. } => None,
        }
    }

    /// Depth-first search for the node at `path`.
    #[must_use]
    pub fn find<'a>(nodes: &'a [FileNode], path: &str) -> Option<&'a FileNode> {
        for node in nodes {
            if node.path == path {
                return Some(node);
            }
            if node.is_dir() && path.starts_with(&format!("{}/", node.path)) {
                return Self::find(node.children(), path);
            }
        }
        None
    }
}
