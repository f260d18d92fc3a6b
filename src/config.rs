//! Project configuration.
//!
//! `.sw/project.toml` is the persisted intent of one project: the selected
//! skills (directly or via a stack reference), the target agents, the
//! install mode, and optional explicit per-agent skill lists. Downstream
//! compiles re-read it; nothing else persists between runs except fork
//! records.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwError};
use crate::resolve::AgentSkillEntry;

/// Where compiled documents land.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMode {
    /// Under the project tree.
    #[default]
    Project,
    /// Under the user-level data directory, shared across projects.
    User,
}

/// Explicit skill list for one agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentAssignment {
    #[serde(default)]
    pub skills: Vec<AgentSkillEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Shared skill source root. Falls back to `SW_SOURCE` or the user
    /// cache when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Stack reference; its members join the selection and its per-agent
    /// map drives assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,

    /// Directly selected skills (ids or aliases).
    #[serde(default)]
    pub skills: Vec<String>,

    /// Target agent ids.
    #[serde(default)]
    pub agents: Vec<String>,

    #[serde(default)]
    pub install_mode: InstallMode,

    /// Downgrade category/conflict validation to warnings.
    #[serde(default)]
    pub expert: bool,

    /// Offer unrestricted selected skills to every agent as dynamic.
    #[serde(default)]
    pub broad_distribution: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Explicit per-agent skill lists; ignored when `stack` is set.
    #[serde(default)]
    pub assignments: BTreeMap<String, AgentAssignment>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source: None,
            stack: None,
            skills: Vec::new(),
            agents: Vec::new(),
            install_mode: InstallMode::default(),
            expert: false,
            broad_distribution: false,
            output_dir: default_output_dir(),
            assignments: BTreeMap::new(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out/agents")
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| SwError::Config(format!("read config {}: {err}", path.display())))?;
        let mut config: Self = toml::from_str(&raw)
            .map_err(|err| SwError::Config(format!("parse config {}: {err}", path.display())))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self)
            .map_err(|err| SwError::Config(format!("serialize config: {err}")))?;
        std::fs::write(path, raw)
            .map_err(|err| SwError::Config(format!("write config {}: {err}", path.display())))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(source) = std::env::var("SW_SOURCE_OVERRIDE") {
            self.source = Some(PathBuf::from(source));
        }
        if std::env::var("SW_EXPERT").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
            self.expert = true;
        }
    }

    /// Where compiled agent documents are written, honoring the install
    /// mode recorded in the config.
    #[must_use]
    pub fn resolved_output_dir(&self, sw_dir: &Path) -> PathBuf {
        if self.output_dir.is_absolute() {
            return self.output_dir.clone();
        }
        match self.install_mode {
            InstallMode::Project => sw_dir.join(&self.output_dir),
            InstallMode::User => dirs::data_dir()
                .unwrap_or_else(|| sw_dir.to_path_buf())
                .join("sw")
                .join(&self.output_dir),
        }
    }
}
