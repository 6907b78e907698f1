// Checklist model and loader. The checklist is a JSON file mapping
// milestone ids to a display name and a list of existence checks; file
// order is kept. Malformed checks load as checks that can never pass.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// What a check looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// A regular file.
    File,
    /// A directory with at least one non-hidden entry.
    Dir,
}

impl CheckKind {
    /// `None` for kinds this tool does not know; such checks never pass.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "file" => Some(CheckKind::File),
            "dir" | "directory" => Some(CheckKind::Dir),
            _ => None,
        }
    }
}

/// One existence check. `kind` keeps the text from the checklist so an
/// unknown kind is still reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub kind: String,
    pub path: String,
}

impl Check {
    pub fn new(kind: &str, path: &str) -> Self {
        Check {
            kind: kind.to_string(),
            path: path.to_string(),
        }
    }

    /// Accepts `{"type": .., "path": ..}` or a `[type, path]` pair. A
    /// non-string type is kept as its JSON text; a missing or non-string
    /// path becomes empty. Neither is an error.
    pub fn from_value(value: &Value) -> Self {
        let (kind, path) = match value {
            Value::Object(map) => (map.get("type"), map.get("path")),
            Value::Array(items) => (items.first(), items.get(1)),
            _ => (None, None),
        };
        let kind = match kind {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        };
        let path = path
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Check { kind, path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub checks: Vec<Check>,
}

/// Milestones in the order the checklist file lists them.
#[derive(Debug, Clone, Default)]
pub struct Checklist {
    pub project: Option<String>,
    pub milestones: Vec<Milestone>,
}

#[derive(Deserialize)]
struct ChecklistFile {
    #[serde(default)]
    project: Option<String>,
    deliverables: Map<String, Value>,
}

#[derive(Deserialize)]
struct MilestoneEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    checks: Vec<Value>,
}

impl Checklist {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read checklist {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid checklist {}", path.display()))
    }

    /// Parse checklist JSON. `deliverables` maps milestone ids to
    /// `{name, checks}`; a missing name falls back to the id and missing
    /// checks to an empty list.
    pub fn parse(text: &str) -> Result<Self> {
        let file: ChecklistFile = serde_json::from_str(text)?;
        let mut milestones = Vec::with_capacity(file.deliverables.len());
        for (id, value) in file.deliverables {
            let entry: MilestoneEntry = serde_json::from_value(value)
                .with_context(|| format!("Invalid deliverable '{id}'"))?;
            milestones.push(Milestone {
                name: entry.name.unwrap_or_else(|| id.clone()),
                id,
                checks: entry.checks.iter().map(Check::from_value).collect(),
            });
        }
        Ok(Checklist {
            project: file.project,
            milestones,
        })
    }

    /// Banner title, e.g. `FAMILY RECIPES - Progress Report`.
    pub fn title(&self) -> String {
        match &self.project {
            Some(project) => format!("{} - Progress Report", project.to_uppercase()),
            None => "Progress Report".to_string(),
        }
    }
}
