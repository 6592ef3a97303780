use crate::resolve::{is_relative_specifier, resolve_import_path};
use repolens_protocol::{DependencyNode, GraphEdge, MatchRule, NodePosition};
use std::collections::HashSet;
use std::f64::consts::PI;

/// Suffixes tried, in order, when an import does not name a node verbatim.
pub const RESOLVABLE_SUFFIXES: &[&str] = &[".ts", ".tsx", ".js", ".jsx", "/index.ts", "/index.tsx"];

const LAYOUT_CENTER: (f64, f64) = (400.0, 300.0);
const LAYOUT_MAX_RADIUS: f64 = 600.0;
const LAYOUT_SPACING: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeMatch<'a> {
    pub target: &'a str,
    pub rule: MatchRule,
    pub ambiguous: bool,
}

/// Maps import strings onto known node ids.
pub struct EdgeMatcher<'a> {
    ids: HashSet<&'a str>,
    ordered: Vec<&'a str>,
}

impl<'a> EdgeMatcher<'a> {
    pub fn new(nodes: &'a [DependencyNode]) -> Self {
        Self {
            ids: nodes.iter().map(|n| n.id.as_str()).collect(),
            ordered: nodes.iter().map(|n| n.id.as_str()).collect(),
        }
    }

    /// First matching rule wins: exact id, id with a resolvable suffix, then
    /// (relative imports only) the first id with the same extensionless basename.
    ///
    /// Relative imports are resolved against the directory of `source` before
    /// the exact and suffix rules run. One that climbs above the root only
    /// gets the basename rule.
    #[must_use]
    pub fn match_import(&self, source: &str, import: &str) -> Option<EdgeMatch<'a>> {
        let key = if is_relative_specifier(import) {
            resolve_import_path(source, import).ok()
        } else {
            Some(import.to_string())
        };

        if let Some(key) = key.as_deref() {
            if let Some(found) = self.match_path(key) {
                return Some(found);
            }
        }

        if !is_relative_specifier(import) {
            return None;
        }
        let name = stem(import);
        if name.is_empty() {
            return None;
        }

        let mut candidates = self
            .ordered
            .iter()
            .filter(|id| **id != source && stem(id) == name);
        let target = *candidates.next()?;
        Some(EdgeMatch {
            target,
            rule: MatchRule::Basename,
            ambiguous: candidates.next().is_some(),
        })
    }

    fn match_path(&self, path: &str) -> Option<EdgeMatch<'a>> {
        if let Some(&target) = self.ids.get(path) {
            return Some(EdgeMatch {
                target,
                rule: MatchRule::Exact,
                ambiguous: false,
            });
        }

        RESOLVABLE_SUFFIXES.iter().find_map(|suffix| {
            let candidate = format!("{path}{suffix}");
            self.ids.get(candidate.as_str()).map(|&target| EdgeMatch {
                target,
                rule: MatchRule::Suffix,
                ambiguous: false,
            })
        })
    }
}

/// Part of the last path segment before its first `.`.
fn stem(path: &str) -> &str {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.split('.').next().unwrap_or(last)
}

/// Directed import edges between graph nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: Vec<GraphEdge>,
}

impl EdgeSet {
    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    #[must_use]
    pub fn into_edges(self) -> Vec<GraphEdge> {
        self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn contains(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// Reverse edges: ids of the nodes that import `id`.
    #[must_use]
    pub fn imported_by(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// Edges that only exist because of the basename heuristic.
    pub fn heuristic(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges
            .iter()
            .filter(|e| e.rule == MatchRule::Basename)
    }
}

/// Match every import of every node. Unmatched imports (external packages,
/// files outside the sample) produce no edge; repeated pairs are collapsed.
#[must_use]
pub fn match_edges(nodes: &[DependencyNode]) -> EdgeSet {
    let matcher = EdgeMatcher::new(nodes);
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut edges = Vec::new();

    for node in nodes {
        for import in &node.imports {
            let Some(found) = matcher.match_import(&node.id, import) else {
                continue;
            };
            if !seen.insert((node.id.as_str(), found.target)) {
                continue;
            }
            if found.ambiguous {
                log::debug!(
                    "Ambiguous basename match {} -> {} (import {import})",
                    node.id,
                    found.target
                );
            }
            edges.push(GraphEdge {
                source: node.id.clone(),
                target: found.target.to_string(),
                rule: found.rule,
                ambiguous: found.ambiguous,
            });
        }
    }

    EdgeSet { edges }
}

/// Place nodes evenly on a circle, in graph order.
#[must_use]
pub fn circular_layout(nodes: &[DependencyNode]) -> Vec<NodePosition> {
    let count = nodes.len();
    #[allow(clippy::cast_precision_loss)]
    let radius = LAYOUT_MAX_RADIUS.min(count as f64 * LAYOUT_SPACING);

    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            #[allow(clippy::cast_precision_loss)]
            let angle = index as f64 / count as f64 * 2.0 * PI;
            NodePosition {
                id: node.id.clone(),
                x: LAYOUT_CENTER.0 + radius * angle.cos(),
                y: LAYOUT_CENTER.1 + radius * angle.sin(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(id: &str, imports: &[&str]) -> DependencyNode {
        DependencyNode::new(id, imports.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn suffix_candidate_rule() {
        let nodes = vec![node("a/x.ts", &[]), node("a/y.ts", &["a/x"])];
        let edges = match_edges(&nodes);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges.edges()[0].source, "a/y.ts");
        assert_eq!(edges.edges()[0].target, "a/x.ts");
        assert_eq!(edges.edges()[0].rule, MatchRule::Suffix);
    }

    #[test]
    fn relative_import_resolves_against_importer_directory() {
        let nodes = vec![node("a/x.ts", &[]), node("a/y.ts", &["./x"])];
        let edges = match_edges(&nodes);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges.edges()[0].source, "a/y.ts");
        assert_eq!(edges.edges()[0].target, "a/x.ts");
        assert_eq!(edges.edges()[0].rule, MatchRule::Suffix);
        assert!(!edges.edges()[0].ambiguous);
    }

    #[test]
    fn sibling_wins_over_same_basename_elsewhere() {
        let nodes = vec![node("b/x.ts", &[]), node("a/x.ts", &[]), node("a/y.ts", &["./x"])];
        let matcher = EdgeMatcher::new(&nodes);
        let found = matcher.match_import("a/y.ts", "./x").unwrap();
        assert_eq!(found.target, "a/x.ts");
        assert_eq!(found.rule, MatchRule::Suffix);

        let nodes = vec![node("lib/x.ts", &[]), node("a/y.ts", &["../x"])];
        let found = EdgeMatcher::new(&nodes).match_import("a/y.ts", "../x").unwrap();
        assert_eq!(found.target, "lib/x.ts");
        assert_eq!(found.rule, MatchRule::Basename);
    }

    #[test]
    fn exact_match_wins_over_suffix() {
        let nodes = vec![
            node("src/a", &[]),
            node("src/a.ts", &[]),
            node("src/main.ts", &["src/a"]),
        ];
        let edges = match_edges(&nodes);
        assert_eq!(edges.edges()[0].target, "src/a");
        assert_eq!(edges.edges()[0].rule, MatchRule::Exact);
    }

    #[test]
    fn suffixes_are_tried_in_order() {
        let nodes = vec![
            node("lib/index.tsx", &[]),
            node("lib.js", &[]),
            node("main.ts", &["lib"]),
        ];
        let matcher = EdgeMatcher::new(&nodes);
        assert_eq!(matcher.match_import("main.ts", "lib").map(|m| m.target), Some("lib.js"));
    }

    #[test]
    fn index_files_resolve_directories() {
        let nodes = vec![
            node("src/components/index.ts", &[]),
            node("src/app.ts", &["src/components"]),
        ];
        assert!(match_edges(&nodes).contains("src/app.ts", "src/components/index.ts"));
    }

    #[test]
    fn basename_fallback_is_last_resort_for_relative_imports() {
        let nodes = vec![
            node("src/utils/format.ts", &[]),
            node("lib/format.js", &[]),
            node("src/app.ts", &["../../format"]),
        ];
        let matcher = EdgeMatcher::new(&nodes);
        let found = matcher.match_import("src/app.ts", "../../format").unwrap();
        assert_eq!(found.rule, MatchRule::Basename);
        assert_eq!(found.target, "src/utils/format.ts");
        assert!(found.ambiguous);

        let edges = match_edges(&nodes);
        assert_eq!(edges.heuristic().count(), 1);
    }

    #[test]
    fn basename_fallback_ignores_bare_specifiers() {
        let nodes = vec![node("src/react.ts", &[]), node("src/app.ts", &["react"])];
        assert!(match_edges(&nodes).is_empty());
    }

    #[test]
    fn external_imports_are_dropped() {
        let nodes = vec![node("a.ts", &["lodash", "@scope/pkg", "b"])];
        assert!(match_edges(&nodes).is_empty());
    }

    #[test]
    fn repeated_imports_collapse_and_reverse_edges_are_derived() {
        let nodes = vec![
            node("a.ts", &[]),
            node("b.ts", &["a", "a.ts"]),
            node("c.ts", &["a"]),
        ];
        let edges = match_edges(&nodes);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges.imported_by("a.ts"), vec!["b.ts", "c.ts"]);
        assert!(edges.imported_by("c.ts").is_empty());
    }

    #[test]
    fn layout_is_circular_and_deterministic() {
        let nodes = vec![node("a", &[]), node("b", &[]), node("c", &[]), node("d", &[])];
        let positions = circular_layout(&nodes);
        assert_eq!(positions.len(), 4);
        let radius = 120.0;
        assert!((positions[0].x - (400.0 + radius)).abs() < 1e-9);
        assert!((positions[0].y - 300.0).abs() < 1e-9);
        assert!((positions[1].x - 400.0).abs() < 1e-9);
        assert!((positions[1].y - (300.0 + radius)).abs() < 1e-9);
        assert_eq!(positions, circular_layout(&nodes));
    }

    #[test]
    fn layout_radius_is_capped() {
        let nodes: Vec<_> = (0..40).map(|i| node(&format!("f{i}.ts"), &[])).collect();
        let first = &circular_layout(&nodes)[0];
        assert!((first.x - 1000.0).abs() < 1e-9);
    }
}
