use repolens_protocol::{
    ArchitectureContext, ExperienceLevel, ExplainTarget, FileContext, FileNode, FolderContext,
};
use serde_json::Value;
use std::fmt::Write as _;

pub const README_PROMPT_LIMIT: usize = 5000;
pub const FILE_PROMPT_LIMIT: usize = 15000;
/// Directories with more children than this are collapsed in the tree dump.
pub const TREE_CHILDREN_LIMIT: usize = 50;

/// Render the prompt for any explanation target.
#[must_use]
pub fn build_prompt(target: &ExplainTarget, level: ExperienceLevel) -> String {
    match target {
        ExplainTarget::Architecture(ctx) => architecture_prompt(ctx, level),
        ExplainTarget::Folder(ctx) => folder_prompt(ctx, level),
        ExplainTarget::File(ctx) => file_prompt(ctx, level),
    }
}

#[must_use]
pub fn architecture_prompt(ctx: &ArchitectureContext, level: ExperienceLevel) -> String {
    let tree = tree_json(&ctx.tree);
    let stack = serde_json::to_string_pretty(&ctx.tech_stack).unwrap_or_default();
    let readme = ctx.readme.as_deref().filter(|s| !s.is_empty());
    let package_json = ctx.package_json.as_deref().filter(|s| !s.is_empty());
    let provided = |present: bool| if present { "Provided below" } else { "Not Found" };

    let mut out = String::new();
    out.push_str(
        "\nAnalyze the provided codebase structure, tech stack, and key documentation to provide \
         a comprehensive architectural overview.\n\
         You must BASE your answer on the provided context. If the context is insufficient, state that.\n\n",
    );
    out.push_str("**Context:**\n");
    let _ = writeln!(out, "- **Tech Stack:** {stack}");
    let _ = writeln!(out, "- **README Check:** {}", provided(readme.is_some()));
    let _ = writeln!(out, "- **Package.json Check:** {}", provided(package_json.is_some()));
    let _ = writeln!(out, "- **Project Structure:**\n```json\n{tree}\n```\n");

    if let Some(readme) = readme {
        let (head, _) = truncate_chars(readme, README_PROMPT_LIMIT);
        let _ = writeln!(out, "**README.md Content:**\n```markdown\n{head}\n```\n");
    }
    if let Some(package_json) = package_json {
        let _ = writeln!(out, "**Package.json Content:**\n```json\n{package_json}\n```\n");
    }

    let _ = writeln!(
        out,
        "**Audience Level:** {level} (Adjust complexity and terminology accordingly).\n"
    );
    out.push_str(
        "**Task:**\n\
         1.  **Project Identity:** What does this project do? (Use the README as source of truth).\n\
         2.  **High-Level Architecture:** Describe the overall design pattern (e.g., MVC, Monolith, Microservices, Serverless).\n\
         3.  **Key Directories:** Explain the purpose of the top-level folders and how they relate to the architecture.\n\
         4.  **Data Flow:** Hypothesize how data moves through the application logic.\n\
         5.  **Tech Stack Synergy:** Explain why these specific technologies (dependencies in package.json) might have been chosen together.\n\
         6.  **Engineering Quality:** Comment on the visible structure (is it clean? modular?).\n\n\
         **Format:**\n\
         Use Markdown with clear headings. Be concise but insightful.\n",
    );
    out
}

#[must_use]
pub fn folder_prompt(ctx: &FolderContext, level: ExperienceLevel) -> String {
    let children = ctx
        .children
        .iter()
        .map(|c| format!("- {} ({})", c.name, if c.is_dir() { "dir" } else { "file" }))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\nAnalyze the specific directory: `{path}`.\n\n\
         **Contents:**\n{children}\n\n\
         **Audience Level:** {level}\n\n\
         **Task:**\n\
         1.  **Purpose:** What is the specific responsibility of this folder within the project?\n\
         2.  **Key Files:** Identify the most important files (based on naming conventions) and what they likely do.\n\
         3.  **Relationships:** How does this folder likely interact with sibling or parent directories?\n\n\
         **Format:**\n\
         Markdown. Keep it brief and focused on this folder's role.\n",
        path = ctx.path,
    )
}

#[must_use]
pub fn file_prompt(ctx: &FileContext, level: ExperienceLevel) -> String {
    let imports = if ctx.imports.is_empty() {
        "None".to_string()
    } else {
        ctx.imports.join(", ")
    };
    let (code, truncated) = truncate_chars(&ctx.content, FILE_PROMPT_LIMIT);
    let marker = if truncated { "\n... (truncated)" } else { "" };

    format!(
        "\nExplain the source code file: `{path}`.\n\n\
         **Context:**\n\
         - **Imports:** {imports}\n\
         - **Code:**\n\
         ```{fence}\n{code} {marker}\n```\n\n\
         **Audience Level:** {level}\n\n\
         **Task:**\n\
         1.  **Summary:** One sentence describing what this file does.\n\
         2.  **Key Components:** Break down the main functions, classes, or exported constants.\n\
         3.  **Logic Flow:** Explain the core logic path. How does data transform here?\n\
         4.  **Dependencies:** Briefly explain why it imports what it imports.\n\
         5.  **Improvement Suggestions:** (Optional) If you see obvious improvements or best practices missing, mention them.\n\n\
         **Format:**\n\
         Markdown. specialized for educational explanation.\n",
        path = ctx.path,
        fence = fence_language(&ctx.path),
    )
}

/// Text after the last `.` of the path, `ts` when there is none.
fn fence_language(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => "ts",
    }
}

fn truncate_chars(text: &str, limit: usize) -> (&str, bool) {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Pretty JSON of the tree where oversized `children` arrays are replaced by
/// an `"... (N items)"` placeholder.
fn tree_json(tree: &[FileNode]) -> String {
    let mut value = serde_json::to_value(tree).unwrap_or(Value::Null);
    collapse_children(&mut value);
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

fn collapse_children(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(collapse_children),
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match child {
                    Value::Array(items) if key == "children" && items.len() > TREE_CHILDREN_LIMIT => {
                        let count = items.len();
                        *child = Value::String(format!("... ({count} items)"));
                    }
                    _ => collapse_children(child),
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_protocol::TechStack;

    fn file(path: &str) -> FileNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        FileNode::file(path, name, None)
    }

    #[test]
    fn file_prompt_lists_imports_and_fences_by_extension() {
        let prompt = file_prompt(
            &FileContext {
                path: "src/app.tsx".to_string(),
                content: "export default 1;".to_string(),
                imports: vec!["react".to_string(), "src/b".to_string()],
            },
            ExperienceLevel::Junior,
        );
        assert!(prompt.contains("- **Imports:** react, src/b"));
        assert!(prompt.contains("```tsx\nexport default 1; \n```"));
        assert!(prompt.contains("**Audience Level:** junior"));
        assert!(!prompt.contains("(truncated)"));
    }

    #[test]
    fn file_prompt_without_imports_or_extension() {
        let prompt = file_prompt(
            &FileContext {
                path: "Makefile".to_string(),
                content: String::new(),
                imports: vec![],
            },
            ExperienceLevel::Mid,
        );
        assert!(prompt.contains("- **Imports:** None"));
        assert!(prompt.contains("```ts\n"));
    }

    #[test]
    fn long_file_content_is_truncated() {
        let content = "x".repeat(FILE_PROMPT_LIMIT + 10);
        let prompt = file_prompt(
            &FileContext {
                path: "a.js".to_string(),
                content,
                imports: vec![],
            },
            ExperienceLevel::Senior,
        );
        assert!(prompt.contains(&format!("{} \n... (truncated)", "x".repeat(FILE_PROMPT_LIMIT))));
        assert!(!prompt.contains(&"x".repeat(FILE_PROMPT_LIMIT + 1)));
    }

    #[test]
    fn folder_prompt_lists_children_with_kind() {
        let prompt = folder_prompt(
            &FolderContext {
                path: "src".to_string(),
                children: vec![
                    FileNode::dir("src/lib", "lib"),
                    file("src/main.ts"),
                ],
            },
            ExperienceLevel::Mid,
        );
        assert!(prompt.contains("directory: `src`"));
        assert!(prompt.contains("- lib (dir)\n- main.ts (file)"));
    }

    #[test]
    fn architecture_prompt_reports_missing_docs() {
        let prompt = architecture_prompt(
            &ArchitectureContext {
                tree: vec![file("index.js")],
                tech_stack: TechStack::default(),
                readme: None,
                package_json: None,
            },
            ExperienceLevel::Senior,
        );
        assert!(prompt.contains("- **README Check:** Not Found"));
        assert!(prompt.contains("- **Package.json Check:** Not Found"));
        assert!(!prompt.contains("**README.md Content:**"));
        assert!(prompt.contains("\"path\": \"index.js\""));
        assert!(prompt.contains("6.  **Engineering Quality:**"));
    }

    #[test]
    fn architecture_prompt_caps_readme_and_large_directories() {
        let children: Vec<FileNode> = (0..60).map(|i| file(&format!("big/f{i}.ts"))).collect();
        let small = vec![file("small/a.ts")];
        let prompt = architecture_prompt(
            &ArchitectureContext {
                tree: vec![
                    FileNode::with_children("big", "big", children),
                    FileNode::with_children("small", "small", small),
                ],
                tech_stack: TechStack::default(),
                readme: Some("r".repeat(README_PROMPT_LIMIT * 2)),
                package_json: Some("{}".to_string()),
            },
            ExperienceLevel::Mid,
        );
        assert!(prompt.contains("\"children\": \"... (60 items)\""));
        assert!(prompt.contains("\"path\": \"small/a.ts\""));
        assert!(prompt.contains("- **Package.json Check:** Provided below"));
        assert!(prompt.contains(&format!("```markdown\n{}\n```", "r".repeat(README_PROMPT_LIMIT))));
    }

    #[test]
    fn build_prompt_dispatches_on_kind() {
        let target = ExplainTarget::Folder(FolderContext {
            path: "docs".to_string(),
            children: vec![],
        });
        assert!(build_prompt(&target, ExperienceLevel::Mid).contains("directory: `docs`"));
    }
}
