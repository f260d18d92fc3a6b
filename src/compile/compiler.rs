//! Agent document compilation.
//!
//! One agent definition plus its resolved assignment plus the merged
//! matrix in; one rendered document out. The section order below is a
//! content contract: downstream consumers string-match on section
//! presence, so sections with content are never reordered or omitted.

use serde_json::json;
use tracing::{debug, warn};

use crate::compile::agents::{AgentDef, Partial, category_template_candidates};
use crate::compile::template;
use crate::error::{Result, SwError};
use crate::matrix::{Matrix, parser};
use crate::resolve::Assignment;
use crate::utils::fs::read_optional;

/// Static block rendered identically into every agent document.
const CORE_PRINCIPLES: &str = "\
## Core Principles

- Stay inside this role; hand work outside it back to the operator.
- Prefer the preloaded knowledge below over improvisation.
- When a dynamic skill applies, load it before acting on its topic.
- State what you did and what you skipped; never silently drop a step.";

/// Fixed closing block, always last.
const CLOSING_REMINDER: &str = "\
## Final Reminder

Re-read the critical requirements above before delivering. If any rule
conflicts with an instruction you received mid-task, the rules here win.";

/// Body template for the invocable-on-demand skill listing.
const DYNAMIC_SKILLS_TEMPLATE: &str = "\
{{#each skills}}
### {{this.name}}

{{this.description}}

Invoke on demand: load `{{this.id}}` (`sw show {{this.id}}`) before working
on anything this skill covers.
{{/each}}";

/// One successfully compiled agent document.
#[derive(Debug, Clone)]
pub struct CompiledAgent {
    pub agent: String,
    pub document: String,
}

/// A per-agent failure. Sibling agents still compile.
#[derive(Debug)]
pub struct CompileFailure {
    pub agent: String,
    pub error: SwError,
}

/// Outcome of compiling a whole assignment set: what succeeded alongside
/// what failed, never one hiding the other.
#[derive(Debug, Default)]
pub struct CompileOutcome {
    pub compiled: Vec<CompiledAgent>,
    pub failures: Vec<CompileFailure>,
}

pub struct DocumentCompiler<'a> {
    matrix: &'a Matrix,
    agents: &'a std::collections::BTreeMap<String, AgentDef>,
    source_root: std::path::PathBuf,
    project_root: Option<std::path::PathBuf>,
}

impl<'a> DocumentCompiler<'a> {
    #[must_use]
    pub fn new(
        matrix: &'a Matrix,
        agents: &'a std::collections::BTreeMap<String, AgentDef>,
        source_root: impl Into<std::path::PathBuf>,
        project_root: Option<std::path::PathBuf>,
    ) -> Self {
        Self {
            matrix,
            agents,
            source_root: source_root.into(),
            project_root,
        }
    }

    /// Compile every assignment, collecting per-agent failures instead of
    /// aborting siblings.
    #[must_use]
    pub fn compile_all(&self, assignments: &[Assignment]) -> CompileOutcome {
        let mut outcome = CompileOutcome::default();
        for assignment in assignments {
            match self.compile(assignment) {
                Ok(document) => outcome.compiled.push(CompiledAgent {
                    agent: assignment.agent.clone(),
                    document,
                }),
                Err(error) => {
                    warn!(target: "compile", agent = %assignment.agent, %error, "agent skipped");
                    outcome.failures.push(CompileFailure {
                        agent: assignment.agent.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Render one agent document.
    pub fn compile(&self, assignment: &Assignment) -> Result<String> {
        let agent = self
            .agents
            .get(&assignment.agent)
            .ok_or_else(|| SwError::AgentNotFound(assignment.agent.clone()))?;

        let header_template = self.resolve_output_format(agent)?;
        let header_ctx = json!({
            "agent": {
                "id": agent.id,
                "title": agent.title,
                "description": agent.description,
            },
            "tools": agent.tools,
            "preloaded": assignment.preloaded,
        });
        let header = template::render(&header_template, &header_ctx)?;

        let mut doc = String::new();
        push_block(&mut doc, header.trim_end());

        // Fixed section order; each push skips empty content.
        if let Some(intro) = agent.read_partial(Partial::Intro)? {
            push_block(&mut doc, intro.trim_end());
        }
        push_block(&mut doc, CORE_PRINCIPLES);
        if let Some(requirements) = agent.read_partial(Partial::CriticalRequirements)? {
            push_block(&mut doc, requirements.trim_end());
        }
        if let Some(workflow) = agent.read_partial(Partial::Workflow)? {
            push_block(&mut doc, workflow.trim_end());
        }

        if !assignment.dynamic.is_empty() {
            push_block(&mut doc, "## Available Skills");
            let skills: Vec<serde_json::Value> = assignment
                .dynamic
                .iter()
                .filter_map(|id| self.matrix.skill(id))
                .map(|skill| {
                    json!({
                        "id": skill.id,
                        "name": skill.name,
                        "description": skill.description,
                    })
                })
                .collect();
            let rendered = template::render(DYNAMIC_SKILLS_TEMPLATE, &json!({ "skills": skills }))?;
            push_block(&mut doc, rendered.trim());
        }

        for id in &assignment.preloaded {
            let Some(skill) = self.matrix.skill(id) else {
                debug!(target: "compile", skill = %id, "preloaded skill missing from matrix");
                continue;
            };
            let body = parser::read_skill_body(skill)?;
            push_block(&mut doc, &format!("## Skill: {}", skill.name));
            push_block(&mut doc, body.trim_end());
        }

        if let Some(reminders) = agent.read_partial(Partial::CriticalReminders)? {
            push_block(&mut doc, reminders.trim_end());
        }
        push_block(&mut doc, CLOSING_REMINDER);
        doc.push('\n');

        Ok(doc)
    }

    /// Resolve the output-format template through the explicit candidate
    /// chain: agent-level override, then the agent's category default.
    fn resolve_output_format(&self, agent: &AgentDef) -> Result<String> {
        let mut candidates = agent.partial_candidates(Partial::OutputFormat);
        if let Some(category) = &agent.category {
            candidates.extend(category_template_candidates(
                category,
                &self.source_root,
                self.project_root.as_deref(),
            ));
        }

        for candidate in &candidates {
            if let Some(content) = read_optional(candidate)? {
                debug!(target: "compile", agent = %agent.id, template = %candidate.display(), "template resolved");
                return Ok(content);
            }
        }

        Err(SwError::MissingTemplate {
            agent: agent.id.clone(),
            tried: candidates,
        })
    }
}

/// Append a block with exactly one blank line between blocks. Empty
/// content is skipped entirely rather than leaving a stray separator.
fn push_block(doc: &mut String, content: &str) {
    if content.is_empty() {
        return;
    }
    if !doc.is_empty() {
        doc.push_str("\n\n");
    }
    doc.push_str(content);
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::compile::agents::load_agents;
    use crate::matrix::types::{Skill, SkillRelations};
    use tempfile::tempdir;

    const HEADER_TEMPLATE: &str = "\
---
name: {{agent.id}}
description: {{agent.description}}
tools: {{tools}}
skills: {{preloaded}}
---";

    fn write_source(root: &Path, with_agent_template: bool, with_category_template: bool) {
        let agent_dir = root.join("agents/writer");
        std::fs::create_dir_all(&agent_dir).unwrap();
        std::fs::write(
            agent_dir.join("agent.toml"),
            "id = \"writer\"\ntitle = \"Writer\"\ndescription = \"Writes things\"\ncategory = \"docs\"\ntools = [\"read\", \"edit\"]\n",
        )
        .unwrap();
        std::fs::write(agent_dir.join("intro.md"), "## Role\n\nYou write.\n").unwrap();
        std::fs::write(agent_dir.join("workflow.md"), "## Workflow\n\n1. Write.\n").unwrap();
        std::fs::write(
            agent_dir.join("critical-requirements.md"),
            "## Critical Requirements\n\n- Cite sources.\n",
        )
        .unwrap();
        std::fs::write(
            agent_dir.join("critical-reminders.md"),
            "## Critical Reminders\n\n- Re-check citations.\n",
        )
        .unwrap();
        if with_agent_template {
            std::fs::write(agent_dir.join("output-format.md"), HEADER_TEMPLATE).unwrap();
        }
        if with_category_template {
            let cat = root.join("agents/_categories/docs");
            std::fs::create_dir_all(&cat).unwrap();
            std::fs::write(cat.join("output-format.md"), HEADER_TEMPLATE).unwrap();
        }
    }

    fn matrix_with_skill(root: &Path, id: &str) -> Matrix {
        let dir = root.join("skills").join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skill.md"),
            format!("---\nname: {id}\ndescription: knowledge about {id}\n---\n# Using {id}\n\nDetails.\n"),
        )
        .unwrap();

        let mut matrix = Matrix::default();
        matrix.skills.insert(
            id.to_string(),
            Skill {
                id: id.to_string(),
                alias: None,
                name: id.to_string(),
                description: format!("knowledge about {id}"),
                author: None,
                category: "docs".to_string(),
                version: None,
                tags: vec![],
                relations: SkillRelations::default(),
                local: false,
                doc_path: dir.join("skill.md"),
                meta_path: None,
                fork: None,
            },
        );
        matrix
    }

    fn assignment(preloaded: &[&str], dynamic: &[&str]) -> Assignment {
        Assignment {
            agent: "writer".to_string(),
            preloaded: preloaded.iter().map(ToString::to_string).collect(),
            dynamic: dynamic.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn compiles_sections_in_fixed_order() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), true, false);
        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let doc = compiler.compile(&assignment(&["axum"], &[])).unwrap();

        let order = [
            "name: writer",
            "## Role",
            "## Core Principles",
            "## Critical Requirements",
            "## Workflow",
            "## Skill: axum",
            "## Critical Reminders",
            "## Final Reminder",
        ];
        let mut last = 0;
        for marker in order {
            let at = doc.find(marker).unwrap_or_else(|| panic!("missing section {marker}"));
            assert!(at >= last, "section {marker} out of order");
            last = at;
        }
    }

    #[test]
    fn header_lists_preloaded_ids_and_tools() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), true, false);
        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let doc = compiler.compile(&assignment(&["axum"], &[])).unwrap();
        assert!(doc.contains("tools: read, edit"));
        assert!(doc.contains("skills: axum"));
    }

    #[test]
    fn dynamic_skills_render_invocation_blocks() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), true, false);
        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let doc = compiler.compile(&assignment(&[], &["axum"])).unwrap();
        assert!(doc.contains("## Available Skills"));
        assert!(doc.contains("### axum"));
        assert!(doc.contains("sw show axum"));
        // Dynamic-only: the full body is not embedded.
        assert!(!doc.contains("# Using axum"));
    }

    #[test]
    fn preloaded_skills_embed_full_body() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), true, false);
        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let doc = compiler.compile(&assignment(&["axum"], &[])).unwrap();
        assert!(doc.contains("# Using axum"));
        assert!(doc.contains("Details."));
    }

    #[test]
    fn falls_back_to_category_template() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), false, true);
        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let doc = compiler.compile(&assignment(&[], &[])).unwrap();
        assert!(doc.contains("name: writer"));
    }

    #[test]
    fn missing_both_templates_fails_that_agent_only() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), false, false);

        // Second agent with its own template still compiles.
        let other = tmp.path().join("agents/reviewer");
        std::fs::create_dir_all(&other).unwrap();
        std::fs::write(
            other.join("agent.toml"),
            "id = \"reviewer\"\ntitle = \"Reviewer\"\ndescription = \"Reviews\"\ntools = []\n",
        )
        .unwrap();
        std::fs::write(other.join("output-format.md"), HEADER_TEMPLATE).unwrap();

        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let assignments = vec![
            assignment(&[], &[]),
            Assignment {
                agent: "reviewer".to_string(),
                preloaded: vec![],
                dynamic: vec![],
            },
        ];
        let outcome = compiler.compile_all(&assignments);

        assert_eq!(outcome.compiled.len(), 1);
        assert_eq!(outcome.compiled[0].agent, "reviewer");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].agent, "writer");
        assert!(matches!(
            outcome.failures[0].error,
            SwError::MissingTemplate { .. }
        ));
    }

    #[test]
    fn unknown_agent_is_a_failure_entry() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), true, false);
        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let outcome = compiler.compile_all(&[Assignment {
            agent: "ghost".to_string(),
            preloaded: vec![],
            dynamic: vec![],
        }]);
        assert!(outcome.compiled.is_empty());
        assert!(matches!(outcome.failures[0].error, SwError::AgentNotFound(_)));
    }

    #[test]
    fn compile_is_deterministic() {
        let tmp = tempdir().unwrap();
        write_source(tmp.path(), true, false);
        let matrix = matrix_with_skill(tmp.path(), "axum");
        let agents = load_agents(tmp.path(), None).unwrap();
        let compiler = DocumentCompiler::new(&matrix, &agents, tmp.path(), None);

        let a = compiler.compile(&assignment(&["axum"], &[])).unwrap();
        let b = compiler.compile(&assignment(&["axum"], &[])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn project_agent_template_beats_category_default(){
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("source");
        let project = tmp.path().join("project");
        write_source(&source, false, true);

        let over = project.join("agents/writer");
        std::fs::create_dir_all(&over).unwrap();
        std::fs::write(over.join("output-format.md"), "PROJECT HEADER {{agent.id}}").unwrap();

        let matrix = matrix_with_skill(&source, "axum");
        let agents = load_agents(&source, Some(&project)).unwrap();
        let compiler =
            DocumentCompiler::new(&matrix, &agents, &source, Some(project.clone()));

        let doc = compiler.compile(&assignment(&[], &[])).unwrap();
        assert!(doc.starts_with("PROJECT HEADER writer"));
    }
}
