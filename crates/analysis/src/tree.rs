use once_cell::sync::Lazy;
use repolens_protocol::{FileNode, FileTreeEntry, NodeKind};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Path segments that drop an entry from the tree wherever they appear.
pub const IGNORED_PATHS: &[&str] = &[
    "node_modules",
    ".git",
    ".next",
    "dist",
    "build",
    "coverage",
    ".DS_Store",
    ".vscode",
    ".idea",
    "yarn.lock",
    "package-lock.json",
    "pnpm-lock.yaml",
];

static DEFAULT_IGNORED: Lazy<HashSet<String>> =
    Lazy::new(|| IGNORED_PATHS.iter().map(|s| (*s).to_string()).collect());

/// Builds the hierarchical tree view from a flat listing.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    ignored: HashSet<String>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            ignored: DEFAULT_IGNORED.clone(),
        }
    }
}

enum Draft {
    File(Option<u64>),
    Dir(HashMap<String, Draft>),
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the ignore set with extra segment names.
    #[must_use]
    pub fn with_ignored<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(extra.into_iter().map(Into::into));
        self
    }

    /// True when any segment of `path` is in the ignore set.
    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        path.split('/').any(|segment| self.ignored.contains(segment))
    }

    /// Build the sorted tree. The result does not depend on input order.
    #[must_use]
    pub fn build(&self, entries: &[FileTreeEntry]) -> Vec<FileNode> {
        let mut root: HashMap<String, Draft> = HashMap::new();

        for entry in entries {
            if self.is_ignored(&entry.path) {
                continue;
            }
            let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
            if segments.is_empty() {
                continue;
            }
            if !insert(&mut root, &segments, entry) {
                log::debug!(
                    "Skipping {}: a parent segment is already a file",
                    entry.path
                );
            }
        }

        finish(root, "")
    }
}

/// Build the tree with the default ignore set.
#[must_use]
pub fn build_file_tree(entries: &[FileTreeEntry]) -> Vec<FileNode> {
    TreeBuilder::default().build(entries)
}

fn insert(level: &mut HashMap<String, Draft>, segments: &[&str], entry: &FileTreeEntry) -> bool {
    let Some((name, rest)) = segments.split_first() else {
        return true;
    };
    let is_leaf = rest.is_empty();

    let node = level.entry((*name).to_string()).or_insert_with(|| {
        if is_leaf && entry.is_blob() {
            Draft::File(entry.size)
        } else {
            Draft::Dir(HashMap::new())
        }
    });

    if is_leaf {
        return true;
    }
    match node {
        Draft::Dir(children) => insert(children, rest, entry),
        Draft::File(_) => false,
    }
}

fn finish(level: HashMap<String, Draft>, parent: &str) -> Vec<FileNode> {
    let mut nodes: Vec<FileNode> = level
        .into_iter()
        .map(|(name, draft)| {
            let path = if parent.is_empty() {
                name.clone()
            } else {
                format!("{parent}/{name}")
            };
            let kind = match draft {
                Draft::File(size) => NodeKind::File { size },
                Draft::Dir(children) => NodeKind::Dir {
                    children: finish(children, &path),
                },
            };
            FileNode { path, name, kind }
        })
        .collect();

    nodes.sort_by(compare_nodes);
    nodes
}

fn compare_nodes(a: &FileNode, b: &FileNode) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}
