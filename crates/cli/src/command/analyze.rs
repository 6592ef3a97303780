use super::{load_repository, open_session};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use repolens_analysis::match_edges;
use repolens_github::GithubClient;
use repolens_protocol::{MatchRule, RepoAnalysis};
use std::fmt::Write as _;

pub(super) async fn run(config: AppConfig, url: &str, json: bool) -> Result<()> {
    let client = GithubClient::new(config.github.clone())?;
    let store = config.history.store()?;
    let mut session = open_session(&store);

    load_repository(&config, &client, &mut session, &store, url).await?;
    let analysis = session
        .analysis()
        .context("Analysis finished without a result")?;

    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
    } else {
        print!("{}", render_report(analysis));
    }
    Ok(())
}

/// Plain-text summary: stack, listing size, top-level tree and graph edges.
#[must_use]
pub fn render_report(analysis: &RepoAnalysis) -> String {
    let list = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", analysis.summary);
    if analysis.truncated {
        out.push_str("(listing truncated by GitHub)\n");
    }
    out.push('\n');
    let _ = writeln!(out, "Frameworks: {}", list(&analysis.tech_stack.frameworks));
    let _ = writeln!(out, "Languages:  {}", list(&analysis.tech_stack.languages));
    let _ = writeln!(out, "Tools:      {}", list(&analysis.tech_stack.tools));

    out.push_str("\nTop level:\n");
    for node in &analysis.file_tree {
        let suffix = if node.is_dir() { "/" } else { "" };
        let _ = writeln!(out, "  {}{suffix}", node.name);
    }

    let edges = match_edges(&analysis.dependency_graph);
    let _ = writeln!(
        out,
        "\nDependency graph: {} files, {} edges",
        analysis.dependency_graph.len(),
        edges.len()
    );
    for edge in edges.edges() {
        let note = match (edge.rule, edge.ambiguous) {
            (MatchRule::Basename, true) => " (basename, ambiguous)",
            (MatchRule::Basename, false) => " (basename)",
            _ => "",
        };
        let _ = writeln!(out, "  {} -> {}{note}", edge.source, edge.target);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_protocol::{DependencyNode, FileNode, TechStack};

    #[test]
    fn report_lists_stack_tree_and_edges() {
        let analysis = RepoAnalysis {
            file_tree: vec![
                FileNode::dir("src", "src"),
                FileNode::file("package.json", "package.json", Some(2)),
            ],
            dependency_graph: vec![
                DependencyNode::new("src/a.ts", vec!["src/b".to_string(), "react".to_string()]),
                DependencyNode::new("src/b.ts", vec![]),
            ],
            tech_stack: TechStack {
                frameworks: vec!["React".to_string()],
                languages: vec!["TypeScript".to_string()],
                tools: vec![],
            },
            summary: "Analyzed 3 files. Detected React.".to_string(),
            readme_content: None,
            package_json_content: Some("{}".to_string()),
            total_files: 3,
            truncated: false,
        };

        let report = render_report(&analysis);
        assert!(report.starts_with("Analyzed 3 files. Detected React.\n\n"));
        assert!(report.contains("Frameworks: React\n"));
        assert!(report.contains("Tools:      -\n"));
        assert!(report.contains("  src/\n  package.json\n"));
        assert!(report.contains("Dependency graph: 2 files, 1 edges\n  src/a.ts -> src/b.ts\n"));
        assert!(!report.contains("truncated"));
    }
}
