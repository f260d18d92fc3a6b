//! Parsing of skill directories and matrix definition documents.
//!
//! A skill directory holds `skill.md` (primary document with a YAML
//! frontmatter header) and `skill.toml` (metadata: author, category,
//! relations, tags, optional fork record). Stack and category definitions
//! live in a `matrix.toml` at the source root.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwError};
use crate::matrix::types::{Category, Skill, SkillRelations, Stack};
use crate::provenance::ForkRecord;

/// Identifiers are lowercase kebab-case, matching directory names.
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("id regex"));

/// YAML frontmatter of a skill's primary document.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillFrontmatter {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// The full schema of `skill.toml`. Round-trips through serde so the
/// provenance tracker can rewrite the fork record without losing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMeta {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork: Option<ForkRecord>,
}

impl SkillMeta {
    pub fn parse_str(content: &str, source: &Path) -> Result<Self> {
        let meta: Self = toml::from_str(content).map_err(|err| {
            SwError::InvalidSkill(format!("parse {}: {err}", source.display()))
        })?;
        if !ID_RE.is_match(&meta.id) {
            return Err(SwError::InvalidSkill(format!(
                "bad skill id '{}' in {}",
                meta.id,
                source.display()
            )));
        }
        Ok(meta)
    }

    pub fn parse_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| SwError::InvalidSkill(format!("read {}: {err}", path.display())))?;
        Self::parse_str(&content, path)
    }

    pub fn write_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|err| SwError::InvalidSkill(format!("serialize {}: {err}", path.display())))?;
        std::fs::write(path, content)
            .map_err(|err| SwError::InvalidSkill(format!("write {}: {err}", path.display())))?;
        Ok(())
    }
}

/// Split a document into its YAML frontmatter and body. Returns None when
/// the document has no `---` header.
#[must_use]
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    let end = rest.find("\n---")?;
    let header = &rest[..end];
    let body = rest[end + 4..].trim_start_matches(['\r', '\n']);
    Some((header, body))
}

pub fn parse_frontmatter(content: &str, source: &Path) -> Result<SkillFrontmatter> {
    let (header, _) = split_frontmatter(content).ok_or_else(|| {
        SwError::InvalidSkill(format!("missing frontmatter in {}", source.display()))
    })?;
    serde_yaml::from_str(header)
        .map_err(|err| SwError::InvalidSkill(format!("frontmatter {}: {err}", source.display())))
}

/// Parse one skill directory into a `Skill`.
pub fn parse_skill_dir(dir: &Path, local: bool) -> Result<Skill> {
    let doc_path = dir.join("skill.md");
    let meta_path = dir.join("skill.toml");
    if !doc_path.is_file() {
        return Err(SwError::InvalidSkill(format!(
            "missing skill.md in {}",
            dir.display()
        )));
    }
    if !meta_path.is_file() {
        return Err(SwError::InvalidSkill(format!(
            "missing skill.toml in {}",
            dir.display()
        )));
    }

    let doc = std::fs::read_to_string(&doc_path)
        .map_err(|err| SwError::InvalidSkill(format!("read {}: {err}", doc_path.display())))?;
    let front = parse_frontmatter(&doc, &doc_path)?;
    let meta = SkillMeta::parse_path(&meta_path)?;

    Ok(Skill {
        id: meta.id,
        alias: meta.alias,
        name: front.name,
        description: front.description,
        author: meta.author,
        category: meta.category,
        version: meta.version,
        tags: meta.tags,
        relations: SkillRelations {
            requires: meta.requires,
            conflicts_with: meta.conflicts_with,
            recommends: meta.recommends,
        },
        local,
        doc_path,
        meta_path: Some(meta_path),
        fork: meta.fork,
    })
}

/// Read a skill's document body with the frontmatter header stripped.
pub fn read_skill_body(skill: &Skill) -> Result<String> {
    let doc = std::fs::read_to_string(&skill.doc_path).map_err(|err| {
        SwError::InvalidSkill(format!("read {}: {err}", skill.doc_path.display()))
    })?;
    Ok(split_frontmatter(&doc)
        .map_or_else(|| doc.trim(), |(_, body)| body.trim())
        .to_string())
}

/// The `matrix.toml` document: category and stack definitions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixDoc {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub stacks: Vec<Stack>,
}

impl MatrixDoc {
    pub fn parse_str(content: &str, source: &Path) -> Result<Self> {
        toml::from_str(content)
            .map_err(|err| SwError::Config(format!("parse {}: {err}", source.display())))
    }

    pub fn parse_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| SwError::Config(format!("read {}: {err}", path.display())))?;
        Self::parse_str(&content, path)
    }
}
