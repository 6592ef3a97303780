use crate::{FileNode, TechStack};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Audience the explanation is written for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    #[default]
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "mid" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            other => Err(format!("unknown experience level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainKind {
    Architecture,
    Folder,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureContext {
    #[serde(default)]
    pub tree: Vec<FileNode>,
    #[serde(default)]
    pub tech_stack: TechStack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderContext {
    pub path: String,
    #[serde(default)]
    pub children: Vec<FileNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Typed view of what an explanation is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainTarget {
    Architecture(ArchitectureContext),
    Folder(FolderContext),
    File(FileContext),
}

impl ExplainTarget {
    #[must_use]
    pub const fn kind(&self) -> ExplainKind {
        match self {
            Self::Architecture(_) => ExplainKind::Architecture,
            Self::Folder(_) => ExplainKind::Folder,
            Self::File(_) => ExplainKind::File,
        }
    }
}

/// Body of `POST /api/explain`: a kind tag, a kind-specific context payload and a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainRequest {
    #[serde(rename = "type")]
    pub kind: ExplainKind,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub level: ExperienceLevel,
}

impl ExplainRequest {
    pub fn new(target: &ExplainTarget, level: ExperienceLevel) -> serde_json::Result<Self> {
        let context = match target {
            ExplainTarget::Architecture(ctx) => serde_json::to_value(ctx)?,
            ExplainTarget::Folder(ctx) => serde_json::to_value(ctx)?,
            ExplainTarget::File(ctx) => serde_json::to_value(ctx)?,
        };
        Ok(Self {
            kind: target.kind(),
            context,
            level,
        })
    }

    /// Decode `context` according to `kind`.
    pub fn target(&self) -> serde_json::Result<ExplainTarget> {
        let context = self.context.clone();
        Ok(match self.kind {
            ExplainKind::Architecture => ExplainTarget::Architecture(serde_json::from_value(
                if context.is_null() {
                    Value::Object(Default::default())
                } else {
                    context
                },
            )?),
            ExplainKind::Folder => ExplainTarget::Folder(serde_json::from_value(context)?),
            ExplainKind::File => ExplainTarget::File(serde_json::from_value(context)?),
        })
    }
}
