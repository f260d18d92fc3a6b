//! sw update - Refresh local skill copies from upstream

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::{Result, SwError};
use crate::provenance::{ForkStatus, status_report, update_skill};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Skill ids to update
    pub skills: Vec<String>,

    /// Update every outdated local skill
    #[arg(long, conflicts_with = "skills")]
    pub all: bool,
}

pub fn run(ctx: &AppContext, args: &UpdateArgs) -> Result<()> {
    let layers = ctx.load_layers()?;
    let Some(local) = layers.local.as_ref().map(|l| &l.skills) else {
        println!("No local skills to update");
        return Ok(());
    };

    let targets: Vec<String> = if args.all {
        status_report(&layers.shared.skills, local)?
            .into_iter()
            .filter(|s| s.status == ForkStatus::Outdated)
            .map(|s| s.id)
            .collect()
    } else if args.skills.is_empty() {
        return Err(SwError::Config(
            "nothing to update; pass skill ids or --all".to_string(),
        ));
    } else {
        args.skills.clone()
    };

    let dest_root = ctx.sw_dir.join("skills");
    let mut updated = Vec::new();
    let mut failures = Vec::new();
    for id in &targets {
        // An update is only meaningful for a tracked local copy whose
        // upstream still exists; everything else is reported, not guessed.
        let source_id = local
            .get(id)
            .and_then(|s| s.fork.as_ref())
            .map_or_else(|| id.clone(), |f| f.source_id.clone());
        match layers.shared.skills.get(&source_id) {
            Some(upstream) => match update_skill(upstream, &dest_root) {
                Ok(record) => updated.push((id.clone(), record.hash)),
                Err(err) => failures.push((id.clone(), err.to_string())),
            },
            None => failures.push((
                id.clone(),
                format!("no upstream skill '{source_id}' (local-only)"),
            )),
        }
    }

    match ctx.output_format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "status": if failures.is_empty() { "ok" } else { "partial" },
                "updated": updated
                    .iter()
                    .map(|(id, hash)| serde_json::json!({"skill": id, "hash": hash}))
                    .collect::<Vec<_>>(),
                "failures": failures
                    .iter()
                    .map(|(id, err)| serde_json::json!({"skill": id, "error": err}))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            if updated.is_empty() && failures.is_empty() {
                println!("Everything is current");
            }
            for (id, _) in &updated {
                println!("{} {}", "updated".green().bold(), id);
            }
            for (id, err) in &failures {
                println!("  {} {id}: {err}", "warning:".yellow().bold());
            }
        }
    }
    Ok(())
}
