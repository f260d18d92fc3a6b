//! Agent role definitions and their source partials.
//!
//! Agents load from the shared source's `agents/` root; a project may
//! override any single partial file (or a whole agent) from its own
//! `agents/` directory. Overrides are file-by-file, not directory-level.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SwError};
use crate::utils::fs::read_optional;

/// The named partials every agent directory may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partial {
    Intro,
    Workflow,
    CriticalRequirements,
    CriticalReminders,
    OutputFormat,
    Examples,
}

impl Partial {
    #[must_use]
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Intro => "intro.md",
            Self::Workflow => "workflow.md",
            Self::CriticalRequirements => "critical-requirements.md",
            Self::CriticalReminders => "critical-reminders.md",
            Self::OutputFormat => "output-format.md",
            Self::Examples => "examples.md",
        }
    }
}

/// `agent.toml` inside an agent directory.
#[derive(Debug, Clone, Deserialize)]
struct AgentManifest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// One agent role: identity plus the directories its partials resolve
/// against, project override first.
#[derive(Debug, Clone)]
pub struct AgentDef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub tools: Vec<String>,
    /// Source directory for this agent's partials.
    pub dir: PathBuf,
    /// Project-local override directory, when present.
    pub override_dir: Option<PathBuf>,
}

impl AgentDef {
    /// Candidate locations for a partial, highest precedence first.
    #[must_use]
    pub fn partial_candidates(&self, partial: Partial) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(over) = &self.override_dir {
            candidates.push(over.join(partial.filename()));
        }
        candidates.push(self.dir.join(partial.filename()));
        candidates
    }

    /// Read a partial's content, override first. None when no file exists.
    pub fn read_partial(&self, partial: Partial) -> Result<Option<String>> {
        for candidate in self.partial_candidates(partial) {
            if let Some(content) = read_optional(&candidate)? {
                return Ok(Some(content));
            }
        }
        Ok(None)
    }
}

/// Load every agent under `<source_root>/agents`, merging in per-file
/// overrides from `<project_root>/agents` when given. An agent directory
/// that exists only in the project root is a purely local agent.
pub fn load_agents(
    source_root: &Path,
    project_root: Option<&Path>,
) -> Result<BTreeMap<String, AgentDef>> {
    let mut agents = BTreeMap::new();

    let source_agents = source_root.join("agents");
    if source_agents.is_dir() {
        for dir in agent_dirs(&source_agents)? {
            let def = load_agent_dir(&dir, None)?;
            agents.insert(def.id.clone(), def);
        }
    }

    if let Some(project_root) = project_root {
        let project_agents = project_root.join("agents");
        if project_agents.is_dir() {
            for dir in agent_dirs(&project_agents)? {
                let name = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let existing = agents
                    .values_mut()
                    .find(|a| a.dir.file_name().is_some_and(|n| n.to_string_lossy() == name.as_str()));
                match existing {
                    Some(existing) => existing.override_dir = Some(dir),
                    None => {
                        // Purely local agent; its manifest must be complete.
                        let def = load_agent_dir(&dir, None)?;
                        agents.insert(def.id.clone(), def);
                    }
                }
            }
        }
    }

    Ok(agents)
}

/// Category-level output-format fallback locations, project first.
#[must_use]
pub fn category_template_candidates(
    category: &str,
    source_root: &Path,
    project_root: Option<&Path>,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(project_root) = project_root {
        candidates.push(
            project_root
                .join("agents/_categories")
                .join(category)
                .join(Partial::OutputFormat.filename()),
        );
    }
    candidates.push(
        source_root
            .join("agents/_categories")
            .join(category)
            .join(Partial::OutputFormat.filename()),
    );
    candidates
}

fn agent_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .map_err(|err| SwError::Config(format!("read {}: {err}", root.display())))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .is_some_and(|name| !name.to_string_lossy().starts_with('_'))
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn load_agent_dir(dir: &Path, override_dir: Option<PathBuf>) -> Result<AgentDef> {
    let manifest_path = dir.join("agent.toml");
    let raw = std::fs::read_to_string(&manifest_path)
        .map_err(|err| SwError::Config(format!("read {}: {err}", manifest_path.display())))?;
    let manifest: AgentManifest = toml::from_str(&raw)
        .map_err(|err| SwError::Config(format!("parse {}: {err}", manifest_path.display())))?;

    Ok(AgentDef {
        id: manifest.id,
        title: manifest.title,
        description: manifest.description,
        category: manifest.category,
        tools: manifest.tools,
        dir: dir.to_path_buf(),
        override_dir,
    })
}
