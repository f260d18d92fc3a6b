//! sw status - Classify local skills against their upstream source

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::provenance::{ForkStatus, status_report};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show skills that are not current
    #[arg(long)]
    pub outdated_only: bool,
}

pub fn run(ctx: &AppContext, args: &StatusArgs) -> Result<()> {
    let layers = ctx.load_layers()?;
    let local = layers.local.as_ref().map(|l| &l.skills);

    let report = match local {
        Some(local) => status_report(&layers.shared.skills, local)?,
        None => Vec::new(),
    };
    let report: Vec<_> = report
        .into_iter()
        .filter(|s| !args.outdated_only || s.status != ForkStatus::Current)
        .collect();

    match ctx.output_format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "status": "ok",
                "count": report.len(),
                "skills": report,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            if report.is_empty() {
                println!("No local skills");
                return Ok(());
            }
            for entry in &report {
                let status = match entry.status {
                    ForkStatus::Current => "current".green(),
                    ForkStatus::Outdated => "outdated".yellow(),
                    ForkStatus::LocalOnly => "local-only".dimmed(),
                };
                println!("{:28} {status}", entry.id);
            }
        }
    }
    Ok(())
}
