use repolens_protocol::{FileTreeEntry, TechStack};
use std::collections::HashSet;

type MarkerTable = &'static [(&'static str, &'static [&'static str])];

/// Marker files (exact lowercase repo paths) that imply a framework.
const FRAMEWORK_MARKERS: MarkerTable = &[
    ("Next.js", &["next.config.js", "next.config.mjs", "next.config.ts"]),
    ("Remix", &["remix.config.js"]),
    ("Gatsby", &["gatsby-config.js"]),
    ("Nuxt", &["nuxt.config.js", "nuxt.config.ts"]),
    ("Angular", &["angular.json"]),
];

/// Extensions that imply a language when at least one path carries them.
const LANGUAGE_EXTENSIONS: MarkerTable = &[
    ("TypeScript", &[".ts", ".tsx"]),
    ("JavaScript", &[".js", ".jsx"]),
    ("Python", &[".py"]),
    ("Rust", &[".rs"]),
    ("Go", &[".go"]),
    ("Java", &[".java"]),
    ("Ruby", &[".rb"]),
    ("PHP", &[".php"]),
];

const TOOL_MARKERS: MarkerTable = &[
    ("Tailwind CSS", &["tailwind.config.js", "tailwind.config.ts"]),
    ("Docker", &["dockerfile"]),
    ("Prisma", &["prisma/schema.prisma"]),
    ("ESLint", &[".eslintrc.json", ".eslintrc.js"]),
    ("TypeScript Config", &["tsconfig.json"]),
    ("Vite", &["vite.config.ts", "vite.config.js"]),
];

/// Classify a flat path list. Matching is case-insensitive; there is no
/// precedence, so contradictory frameworks can both be reported.
pub fn detect_tech_stack<'a, I>(paths: I) -> TechStack
where
    I: IntoIterator<Item = &'a str>,
{
    let paths: HashSet<String> = paths.into_iter().map(str::to_lowercase).collect();

    let frameworks = FRAMEWORK_MARKERS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| paths.contains(*m)))
        .map(|(label, _)| (*label).to_string())
        .collect();

    let languages = LANGUAGE_EXTENSIONS
        .iter()
        .filter(|(_, exts)| {
            paths
                .iter()
                .any(|path| exts.iter().any(|ext| path.ends_with(ext)))
        })
        .map(|(label, _)| (*label).to_string())
        .collect();

    let tools = TOOL_MARKERS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| paths.contains(*m)))
        .map(|(label, _)| (*label).to_string())
        .collect();

    TechStack {
        frameworks,
        languages,
        tools,
    }
}

pub fn detect_tech_stack_from_entries(entries: &[FileTreeEntry]) -> TechStack {
    detect_tech_stack(entries.iter().map(|e| e.path.as_str()))
}
