//! sw init - Scaffold a .sw project directory

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::{Result, SwError};
use crate::utils::fs::ensure_dir;

const DEFAULT_PROJECT_TOML: &str = r#"# skillweaver project configuration.
#
# source = "/path/to/shared/skill/source"   # or set SW_SOURCE
# stack = "fullstack"                        # select a curated stack...
# skills = ["axum", "sqlx"]                  # ...and/or individual skills
# agents = ["backend-dev", "reviewer"]
#
# [assignments.backend-dev]
# skills = [
#     { skill = "axum" },                    # preloaded
#     { skill = "sqlx", dynamic = true },    # invoked on demand
# ]

skills = []
agents = []
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Overwrite an existing project.toml
    #[arg(long)]
    pub force: bool,
}

/// Init runs before a project context exists, so it has its own entry
/// point that never tries to locate a `.sw` directory.
pub fn run_without_context(robot: bool, args: &InitArgs) -> Result<()> {
    let base = match &args.path {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };
    let sw_dir = base.join(".sw");
    ensure_dir(&sw_dir)?;
    ensure_dir(sw_dir.join("skills"))?;
    ensure_dir(sw_dir.join("agents"))?;

    let config_path = sw_dir.join("project.toml");
    if config_path.exists() && !args.force {
        return Err(SwError::Config(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }
    std::fs::write(&config_path, DEFAULT_PROJECT_TOML)
        .map_err(|err| SwError::Config(format!("write {}: {err}", config_path.display())))?;

    if robot {
        let out = serde_json::json!({
            "status": "ok",
            "project": sw_dir.display().to_string(),
        });
        println!("{}", serde_json::to_string(&out).unwrap_or_default());
    } else {
        println!("{} {}", "initialized".green().bold(), sw_dir.display());
        println!();
        println!("Next: edit {} and run `sw validate`", config_path.display());
    }
    Ok(())
}

pub fn run(_ctx: &AppContext, args: &InitArgs) -> Result<()> {
    // Re-initializing inside an existing project is allowed; it only
    // scaffolds missing pieces.
    run_without_context(false, args)
}
