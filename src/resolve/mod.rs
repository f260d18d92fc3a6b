//! Agent assignment resolution.
//!
//! Takes the validated selection and partitions it per target agent into
//! preloaded (always present in the compiled document's header) and dynamic
//! (invoked on demand from the body) skills. Assignment is driven by an
//! explicit configuration structure, either a stack's per-agent technology
//! map or the project's per-agent skill lists; there is no process-wide
//! mapping state. Output is deterministic: for the same matrix, selection,
//! and configuration the partition is byte-identical across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::ProjectConfig;
use crate::error::{Result, SwError};
use crate::matrix::{Matrix, StackAgentEntry};

/// One entry in an explicit per-agent skill list. Listing a skill without a
/// dynamic marker means it is preloaded for that agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkillEntry {
    pub skill: String,
    #[serde(default)]
    pub dynamic: bool,
}

/// How skills map onto agents for one resolution pass.
#[derive(Debug, Clone)]
pub enum AssignmentConfig {
    /// A stack's per-agent technology map: agent -> role -> entry.
    Stack(BTreeMap<String, BTreeMap<String, StackAgentEntry>>),
    /// Explicit per-agent skill lists from project configuration.
    Explicit(BTreeMap<String, Vec<AgentSkillEntry>>),
}

impl AssignmentConfig {
    /// Build the assignment configuration recorded in a project config:
    /// the resolved stack reference when one is set, otherwise the explicit
    /// per-agent map.
    pub fn from_project(matrix: &Matrix, config: &ProjectConfig) -> Result<Self> {
        if let Some(stack_id) = &config.stack {
            let stack = matrix
                .stack(stack_id)
                .ok_or_else(|| SwError::StackNotFound(stack_id.clone()))?;
            return Ok(Self::Stack(stack.agents.clone()));
        }
        Ok(Self::Explicit(
            config
                .assignments
                .iter()
                .map(|(agent, entry)| (agent.clone(), entry.skills.clone()))
                .collect(),
        ))
    }

    /// Every skill id referenced under any agent.
    fn referenced_skills(&self) -> BTreeSet<&str> {
        match self {
            Self::Stack(map) => map
                .values()
                .flat_map(|roles| roles.values())
                .map(|entry| entry.skill.as_str())
                .collect(),
            Self::Explicit(map) => map
                .values()
                .flatten()
                .map(|entry| entry.skill.as_str())
                .collect(),
        }
    }

    /// The (preloaded, dynamic) partition configured for one agent,
    /// restricted to the selected set.
    fn partition_for(
        &self,
        agent: &str,
        selected: &BTreeSet<&str>,
    ) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut preloaded = BTreeSet::new();
        let mut dynamic = BTreeSet::new();
        match self {
            Self::Stack(map) => {
                if let Some(roles) = map.get(agent) {
                    for entry in roles.values() {
                        if !selected.contains(entry.skill.as_str()) {
                            continue;
                        }
                        if entry.preloaded {
                            preloaded.insert(entry.skill.clone());
                        } else {
                            dynamic.insert(entry.skill.clone());
                        }
                    }
                }
            }
            Self::Explicit(map) => {
                if let Some(entries) = map.get(agent) {
                    for entry in entries {
                        if !selected.contains(entry.skill.as_str()) {
                            continue;
                        }
                        if entry.dynamic {
                            dynamic.insert(entry.skill.clone());
                        } else {
                            preloaded.insert(entry.skill.clone());
                        }
                    }
                }
            }
        }
        // A skill preloaded for an agent is never also dynamic for it.
        for id in &preloaded {
            dynamic.remove(id);
        }
        (preloaded, dynamic)
    }
}

/// The resolved skill partition for one agent. Transient: recomputed from
/// the matrix and selection on every compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub agent: String,
    pub preloaded: Vec<String>,
    pub dynamic: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Offer every selected skill that no other agent is restricted to as a
    /// dynamic skill on every target agent.
    pub broad_distribution: bool,
}

/// Expand the selection recorded in a project config: stack members first,
/// then explicitly listed skills, alias-resolved and deduplicated.
pub fn selection_from_project(matrix: &Matrix, config: &ProjectConfig) -> Result<Vec<String>> {
    let mut names = Vec::new();
    if let Some(stack_id) = &config.stack {
        let stack = matrix
            .stack(stack_id)
            .ok_or_else(|| SwError::StackNotFound(stack_id.clone()))?;
        names.extend(stack.skills.iter().cloned());
    }
    names.extend(config.skills.iter().cloned());
    Ok(matrix.resolve_names(&names))
}

/// Partition the validated selection across the target agents.
///
/// An agent with no configuration entry receives an empty-but-valid
/// assignment unless broad distribution is requested. Both lists are sorted
/// by skill id so compiled output is reproducible for diffing.
#[must_use]
pub fn resolve_assignments(
    selection: &[String],
    agents: &[String],
    config: &AssignmentConfig,
    opts: ResolveOptions,
) -> Vec<Assignment> {
    let selected: BTreeSet<&str> = selection.iter().map(String::as_str).collect();
    let referenced = config.referenced_skills();

    // Sorted, deduplicated target list keeps output stable regardless of
    // the order agents were named in.
    let targets: BTreeSet<&str> = agents.iter().map(String::as_str).collect();

    let mut assignments = Vec::new();
    for agent in targets {
        let (preloaded, mut dynamic) = config.partition_for(agent, &selected);

        if opts.broad_distribution {
            // A skill referenced by some agent's configuration is restricted
            // to those agents; everything else is offered everywhere.
            let mut additions = Vec::new();
            for id in &selected {
                let id: &str = id;
                let restricted_elsewhere = referenced.contains(id)
                    && !preloaded.contains(id)
                    && !dynamic.contains(id);
                if !restricted_elsewhere && !preloaded.contains(id) {
                    additions.push(id.to_string());
                }
            }
            dynamic.extend(additions);
        }

        assignments.push(Assignment {
            agent: agent.to_string(),
            preloaded: preloaded.into_iter().collect(),
            dynamic: dynamic.into_iter().collect(),
        });
    }

    assignments
}
