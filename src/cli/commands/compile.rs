//! sw compile - Compile agent documents from the current selection

use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{print_issue_list, print_load_warnings};
use crate::compile::{DocumentCompiler, load_agents};
use crate::error::{Result, SwError};
use crate::resolve::{
    AssignmentConfig, ResolveOptions, resolve_assignments, selection_from_project,
};
use crate::utils::fs::ensure_dir;
use crate::validate::validate_selection;

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Compile only these agents (defaults to every configured agent)
    #[arg(long, short)]
    pub agent: Vec<String>,

    /// Print documents to stdout instead of writing files
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(ctx: &AppContext, args: &CompileArgs) -> Result<()> {
    let source_root = ctx.source_root()?;
    let (matrix, warnings) = ctx.load_matrix()?;
    print_load_warnings(&warnings);

    // Fail fast before any write: the selection must validate.
    let selection = selection_from_project(&matrix, &ctx.config)?;
    let report = validate_selection(&matrix, &selection, ctx.config.expert);
    print_issue_list("error", &report.errors, true);
    print_issue_list("warning", &report.warnings, false);
    if !report.valid {
        return Err(SwError::SelectionInvalid(report.errors.len()));
    }

    let targets = if args.agent.is_empty() {
        ctx.config.agents.clone()
    } else {
        args.agent.clone()
    };
    let assignment_config = AssignmentConfig::from_project(&matrix, &ctx.config)?;
    let assignments = resolve_assignments(
        &selection,
        &targets,
        &assignment_config,
        ResolveOptions {
            broad_distribution: ctx.config.broad_distribution,
        },
    );

    let agents = load_agents(&source_root, Some(&ctx.sw_dir))?;
    let compiler = DocumentCompiler::new(
        &matrix,
        &agents,
        source_root.clone(),
        Some(ctx.sw_dir.clone()),
    );
    let outcome = compiler.compile_all(&assignments);

    let output_dir = ctx.config.resolved_output_dir(&ctx.sw_dir);
    let mut written = Vec::new();
    if !args.dry_run {
        ensure_dir(&output_dir)?;
        for compiled in &outcome.compiled {
            let path = output_dir.join(format!("{}.md", compiled.agent));
            std::fs::write(&path, compiled.document.as_bytes())
                .map_err(|err| SwError::Config(format!("write {}: {err}", path.display())))?;
            info!(target: "compile", agent = %compiled.agent, path = %path.display(), "document written");
            written.push(path);
        }
    }

    match ctx.output_format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "status": if outcome.failures.is_empty() { "ok" } else { "partial" },
                "compiled": outcome.compiled.iter().map(|c| &c.agent).collect::<Vec<_>>(),
                "written": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
                "failures": outcome
                    .failures
                    .iter()
                    .map(|f| serde_json::json!({"agent": f.agent, "error": f.error.to_string()}))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            if args.dry_run {
                for compiled in &outcome.compiled {
                    println!("{}", format!("=== {} ===", compiled.agent).bold());
                    println!("{}", compiled.document);
                }
            } else {
                for path in &written {
                    println!("{} {}", "wrote".green().bold(), path.display());
                }
            }
            for failure in &outcome.failures {
                println!(
                    "  {} agent '{}' skipped: {}",
                    "warning:".yellow().bold(),
                    failure.agent,
                    failure.error
                );
            }
        }
    }

    Ok(())
}
