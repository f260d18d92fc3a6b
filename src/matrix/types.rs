//! Core matrix types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::provenance::ForkRecord;

/// A unit of reusable knowledge: one primary document plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Canonical identifier, globally unique within a merged matrix.
    pub id: String,
    /// Optional short alias, unique within a matrix.
    pub alias: Option<String>,
    /// Display name from the document header.
    pub name: String,
    pub description: String,
    pub author: Option<String>,
    /// Category path, e.g. "frontend-framework".
    pub category: String,
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub relations: SkillRelations,
    /// True when sourced from the project's own override directory. A local
    /// skill always shadows a non-local skill with the same id.
    #[serde(default)]
    pub local: bool,
    /// Path to the primary document (skill.md).
    pub doc_path: PathBuf,
    /// Path to the metadata document (skill.toml), if present.
    pub meta_path: Option<PathBuf>,
    /// Provenance record for locally-copied skills.
    pub fork: Option<ForkRecord>,
}

/// Relation lists constraining how a skill may be selected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillRelations {
    /// Skill ids that must also be selected.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Skill ids that must not co-occur with this one.
    #[serde(default)]
    pub conflicts_with: Vec<String>,
    /// Soft suggestions; unmet recommendations are warnings, not errors.
    #[serde(default)]
    pub recommends: Vec<String>,
}

/// A grouping node. When `exclusive` is true, at most one skill from the
/// category may be selected at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exclusive: bool,
}

/// One technology-role entry in a stack's per-agent mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackAgentEntry {
    pub skill: String,
    #[serde(default)]
    pub preloaded: bool,
}

/// A named, curated bundle of skills with a per-agent technology mapping.
/// Stacks are a selection template: once expanded, their members are
/// ordinary selected skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Member skill ids.
    #[serde(default)]
    pub skills: Vec<String>,
    /// agent id -> technology role -> entry.
    #[serde(default)]
    pub agents: BTreeMap<String, BTreeMap<String, StackAgentEntry>>,
}

/// The merged snapshot consumed by the validator, resolver, and compiler.
#[derive(Debug, Clone, Default)]
pub struct Matrix {
    pub skills: BTreeMap<String, Skill>,
    pub categories: BTreeMap<String, Category>,
    pub stacks: BTreeMap<String, Stack>,
    /// alias -> canonical id, built once at merge time and consulted by
    /// every downstream component.
    pub aliases: BTreeMap<String, String>,
}

impl Matrix {
    #[must_use]
    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.get(id)
    }

    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    #[must_use]
    pub fn stack(&self, id: &str) -> Option<&Stack> {
        self.stacks.get(id)
    }

    /// Resolve a user-supplied name to a canonical skill id. An exact id
    /// match wins over an alias of the same spelling.
    #[must_use]
    pub fn resolve_id<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.skills.contains_key(name) {
            return Some(name);
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// Alias-resolve a list of names, preserving order and dropping
    /// duplicates. Names that resolve to nothing pass through unchanged so
    /// the validator can report them as `SkillNotFound`.
    #[must_use]
    pub fn resolve_names(&self, names: &[String]) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for name in names {
            let canonical = self
                .resolve_id(name)
                .map_or_else(|| name.clone(), ToString::to_string);
            if seen.insert(canonical.clone()) {
                out.push(canonical);
            }
        }
        out
    }
}
