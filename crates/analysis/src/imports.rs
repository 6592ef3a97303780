use crate::error::{AnalysisError, Result};
use crate::language::ScriptDialect;
use tree_sitter::{Node, Parser};

/// Collects module specifiers from JS/TS sources.
///
/// Recognized forms: `import ... from "x"`, `import "x"`, `export ... from "x"`
/// and `import("x")` anywhere in the file. Specifiers are returned raw, in
/// source order, duplicates included.
pub struct ImportExtractor {
    javascript: Parser,
    typescript: Parser,
    tsx: Parser,
}

impl ImportExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            javascript: Self::parser_for(ScriptDialect::JavaScript)?,
            typescript: Self::parser_for(ScriptDialect::TypeScript)?,
            tsx: Self::parser_for(ScriptDialect::Tsx)?,
        })
    }

    fn parser_for(dialect: ScriptDialect) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.tree_sitter_language())
            .map_err(|e| {
                AnalysisError::ParserLanguage(format!("{}: {e}", dialect.as_str()))
            })?;
        Ok(parser)
    }

    /// Extract specifiers from `content`. Files that are not scripts, and
    /// files that do not parse cleanly, yield no imports.
    pub fn extract(&mut self, path: &str, content: &str) -> Vec<String> {
        let Some(dialect) = ScriptDialect::from_path(path) else {
            return Vec::new();
        };

        let parser = match dialect {
            ScriptDialect::JavaScript => &mut self.javascript,
            ScriptDialect::TypeScript => &mut self.typescript,
            ScriptDialect::Tsx => &mut self.tsx,
        };

        let Some(tree) = parser.parse(content, None) else {
            log::debug!("Parser gave up on {path}");
            return Vec::new();
        };

        let root = tree.root_node();
        if root.has_error() {
            log::debug!("Syntax errors in {path}, skipping import extraction");
            return Vec::new();
        }

        let mut imports = Vec::new();
        collect_specifiers(root, content.as_bytes(), &mut imports);
        imports
    }
}

/// One-shot extraction. Parser setup failures degrade to no imports.
pub fn extract_imports(path: &str, content: &str) -> Vec<String> {
    match ImportExtractor::new() {
        Ok(mut extractor) => extractor.extract(path, content),
        Err(err) => {
            log::warn!("Import extraction unavailable: {err}");
            Vec::new()
        }
    }
}

/// Pre-order walk over the whole tree, so dynamic imports nested in
/// functions or blocks are found too.
fn collect_specifiers(root: Node, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        match node.kind() {
            "import_statement" | "export_statement" => {
                if let Some(spec) = node
                    .child_by_field_name("source")
                    .and_then(|s| string_literal(s, source))
                {
                    out.push(spec);
                }
            }
            "call_expression" if is_dynamic_import(node) => {
                if let Some(spec) = first_argument(node).and_then(|arg| string_literal(arg, source))
                {
                    out.push(spec);
                }
            }
            _ => {}
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn is_dynamic_import(call: Node) -> bool {
    call.child_by_field_name("function")
        .is_some_and(|function| function.kind() == "import")
}

fn first_argument(call: Node) -> Option<Node> {
    let args = call.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let first = args
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first
}

/// Text of a plain string literal without its quotes. Template strings and
/// any other expression return `None`.
fn string_literal(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let raw = node.utf8_text(source).ok()?;
    let inner = raw
        .strip_prefix(['"', '\''])
        .and_then(|s| s.strip_suffix(['"', '\'']))?;
    Some(inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(path: &str, content: &str) -> Vec<String> {
        ImportExtractor::new().unwrap().extract(path, content)
    }

    #[test]
    fn static_and_dynamic_imports_in_source_order() {
        let imports = extract("a/x.ts", r#"import {X} from "./foo"; import("./bar");"#);
        assert_eq!(imports, vec!["./foo", "./bar"]);
    }

    #[test]
    fn syntax_error_yields_nothing() {
        let imports = extract("broken.ts", "import { X from './foo';\nconst = ;");
        assert!(imports.is_empty());
    }

    #[test]
    fn non_script_files_are_skipped() {
        assert!(extract("README.md", "import x from './y'").is_empty());
        assert!(extract("main.py", "import os").is_empty());
    }

    #[test]
    fn re_exports_and_side_effect_imports() {
        let source = r#"
import "./polyfills";
import type { Props } from './types';
export * from "./utils";
export { default as Button } from "./Button";
export const local = 1;
"#;
        let imports = extract("src/index.ts", source);
        assert_eq!(imports, vec!["./polyfills", "./types", "./utils", "./Button"]);
    }

    #[test]
    fn nested_dynamic_imports_are_found() {
        let source = r#"
export async function load(flag: boolean) {
    if (flag) {
        const m = await import("./heavy");
        return m;
    }
    return () => import('./lazy');
}
"#;
        assert_eq!(extract("src/load.ts", source), vec!["./heavy", "./lazy"]);
    }

    #[test]
    fn computed_dynamic_imports_are_skipped() {
        let source = r#"
const name = "x";
import(name);
import(`./pages/${name}`);
import("./" + name);
import("./static");
"#;
        assert_eq!(extract("src/router.js", source), vec!["./static"]);
    }

    #[test]
    fn jsx_sources_parse() {
        let source = r#"
import React from "react";
import { Card } from "../components/Card";

export default function Page() {
    return <Card title="hi" />;
}
"#;
        assert_eq!(
            extract("app/page.tsx", source),
            vec!["react", "../components/Card"]
        );
        assert_eq!(
            extract("app/page.jsx", source),
            vec!["react", "../components/Card"]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let source = "import a from './a';\nimport { b } from './a';\n";
        assert_eq!(extract("x.mjs", source), vec!["./a", "./a"]);
    }

    #[test]
    fn one_shot_helper_matches_extractor() {
        assert_eq!(extract_imports("a.cjs", "import('./x');"), vec!["./x"]);
    }
}
