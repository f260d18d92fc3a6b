//! Shared fixture builders for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Builder for a skill-source tree under a temp directory.
pub struct SourceFixture {
    pub root: PathBuf,
}

impl SourceFixture {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        std::fs::create_dir_all(root.join("skills")).unwrap();
        Self { root }
    }

    pub fn skill(&self, id: &str, category: &str) -> SkillBuilder {
        SkillBuilder {
            root: self.root.clone(),
            id: id.to_string(),
            category: category.to_string(),
            alias: None,
            requires: vec![],
            conflicts_with: vec![],
            recommends: vec![],
            body: format!("# Using {id}\n\nDetails about {id}."),
        }
    }

    pub fn matrix_toml(&self, content: &str) {
        std::fs::write(self.root.join("matrix.toml"), content).unwrap();
    }

    pub fn agent(&self, id: &str, category: Option<&str>) {
        let dir = self.root.join("agents").join(id);
        std::fs::create_dir_all(&dir).unwrap();
        let category_line = category.map_or(String::new(), |c| format!("category = \"{c}\"\n"));
        std::fs::write(
            dir.join("agent.toml"),
            format!(
                "id = \"{id}\"\ntitle = \"{id}\"\ndescription = \"The {id} role\"\n{category_line}tools = [\"read\"]\n"
            ),
        )
        .unwrap();
        std::fs::write(dir.join("intro.md"), format!("## Role\n\nYou are {id}.\n")).unwrap();
        std::fs::write(dir.join("workflow.md"), "## Workflow\n\n1. Work.\n").unwrap();
        std::fs::write(
            dir.join("critical-requirements.md"),
            "## Critical Requirements\n\n- Be precise.\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("critical-reminders.md"),
            "## Critical Reminders\n\n- Stay precise.\n",
        )
        .unwrap();
    }

    pub fn agent_template(&self, id: &str) {
        let dir = self.root.join("agents").join(id);
        std::fs::write(dir.join("output-format.md"), header_template()).unwrap();
    }

    pub fn category_template(&self, category: &str) {
        let dir = self.root.join("agents/_categories").join(category);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("output-format.md"), header_template()).unwrap();
    }
}

pub struct SkillBuilder {
    root: PathBuf,
    id: String,
    category: String,
    alias: Option<String>,
    requires: Vec<String>,
    conflicts_with: Vec<String>,
    recommends: Vec<String>,
    body: String,
}

impl SkillBuilder {
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn requires(mut self, ids: &[&str]) -> Self {
        self.requires = ids.iter().map(ToString::to_string).collect();
        self
    }

    pub fn conflicts_with(mut self, ids: &[&str]) -> Self {
        self.conflicts_with = ids.iter().map(ToString::to_string).collect();
        self
    }

    pub fn recommends(mut self, ids: &[&str]) -> Self {
        self.recommends = ids.iter().map(ToString::to_string).collect();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn write(self) -> PathBuf {
        let dir = self.root.join("skills").join(&self.id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skill.md"),
            format!(
                "---\nname: {}\ndescription: knowledge about {}\n---\n{}\n",
                self.id, self.id, self.body
            ),
        )
        .unwrap();

        let mut meta = format!("id = \"{}\"\ncategory = \"{}\"\n", self.id, self.category);
        if let Some(alias) = &self.alias {
            meta.push_str(&format!("alias = \"{alias}\"\n"));
        }
        for (key, list) in [
            ("requires", &self.requires),
            ("conflicts_with", &self.conflicts_with),
            ("recommends", &self.recommends),
        ] {
            if !list.is_empty() {
                let quoted: Vec<String> = list.iter().map(|s| format!("\"{s}\"")).collect();
                meta.push_str(&format!("{key} = [{}]\n", quoted.join(", ")));
            }
        }
        std::fs::write(dir.join("skill.toml"), meta).unwrap();
        dir
    }
}

pub fn header_template() -> &'static str {
    "---\nname: {{agent.id}}\ndescription: {{agent.description}}\ntools: {{tools}}\nskills: {{preloaded}}\n---"
}

/// A minimal `.sw` project directory beside a source fixture.
pub fn project_dir(base: &Path) -> PathBuf {
    let sw = base.join("project/.sw");
    std::fs::create_dir_all(sw.join("skills")).unwrap();
    sw
}
