//! sw copy - Copy shared skills into the project with fork records

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Args;
use colored::Colorize;
use indicatif::ProgressBar;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::{Result, SwError};
use crate::matrix::Skill;
use crate::provenance::{CopyOutcome, copy_skill};

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Skill ids or aliases to copy
    #[arg(required = true)]
    pub skills: Vec<String>,

    /// Overwrite existing local copies
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &CopyArgs) -> Result<()> {
    let layers = ctx.load_layers()?;

    // Copies come from the shared layer; a local override cannot be its
    // own upstream. Aliases resolve against shared entries only.
    let mut skills: Vec<&Skill> = Vec::new();
    for name in &args.skills {
        let skill = layers
            .shared
            .skills
            .get(name)
            .or_else(|| {
                layers
                    .shared
                    .skills
                    .values()
                    .find(|s| s.alias.as_deref() == Some(name))
            })
            .ok_or_else(|| SwError::InvalidSkill(format!("unknown shared skill '{name}'")))?;
        skills.push(skill);
    }

    let dest_root = ctx.sw_dir.join("skills");
    let abort = AtomicBool::new(false);
    let progress = (ctx.output_format == OutputFormat::Human && skills.len() > 1)
        .then(|| ProgressBar::new(skills.len() as u64));

    let mut outcome = CopyOutcome::default();
    for skill in &skills {
        if abort.load(Ordering::SeqCst) {
            outcome.aborted = true;
            break;
        }
        match copy_skill(skill, &dest_root, args.force) {
            Ok(_) => outcome.copied.push(skill.id.clone()),
            Err(err) => outcome.failures.push((skill.id.clone(), err)),
        }
        if let Some(progress) = &progress {
            progress.inc(1);
        }
    }
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    match ctx.output_format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "status": if outcome.failures.is_empty() { "ok" } else { "partial" },
                "copied": outcome.copied,
                "aborted": outcome.aborted,
                "failures": outcome
                    .failures
                    .iter()
                    .map(|(id, err)| serde_json::json!({"skill": id, "error": err.to_string()}))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            for id in &outcome.copied {
                println!("{} {}", "copied".green().bold(), id);
            }
            for (id, err) in &outcome.failures {
                println!("  {} {id}: {err}", "warning:".yellow().bold());
            }
            if outcome.aborted {
                println!("{}", "aborted; already-copied skills were kept".yellow());
            }
        }
    }
    Ok(())
}
