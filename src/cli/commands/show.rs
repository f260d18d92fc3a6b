//! sw show - Show one skill's metadata and document

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::print_load_warnings;
use crate::error::{Result, SwError};
use crate::matrix::parser::read_skill_body;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Skill id or alias
    pub skill: String,

    /// Print metadata only, not the document body
    #[arg(long)]
    pub meta_only: bool,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let (matrix, warnings) = ctx.load_matrix()?;
    print_load_warnings(&warnings);

    let id = matrix
        .resolve_id(&args.skill)
        .ok_or_else(|| SwError::InvalidSkill(format!("unknown skill '{}'", args.skill)))?
        .to_string();
    let skill = matrix
        .skill(&id)
        .ok_or_else(|| SwError::InvalidSkill(format!("unknown skill '{id}'")))?;

    match ctx.output_format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(skill)
                .map_err(|err| SwError::Config(format!("serialize skill: {err}")))?;
            if !args.meta_only {
                value["body"] = serde_json::Value::String(read_skill_body(skill)?);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_default()
            );
        }
        _ => {
            println!("{} {}", skill.name.bold(), format!("({})", skill.id).dimmed());
            if let Some(alias) = &skill.alias {
                println!("alias:     {alias}");
            }
            println!("category:  {}", skill.category);
            if let Some(author) = &skill.author {
                println!("author:    {author}");
            }
            if let Some(version) = &skill.version {
                println!("version:   {version}");
            }
            if !skill.tags.is_empty() {
                println!("tags:      {}", skill.tags.join(", "));
            }
            if !skill.relations.requires.is_empty() {
                println!("requires:  {}", skill.relations.requires.join(", "));
            }
            if !skill.relations.conflicts_with.is_empty() {
                println!("conflicts: {}", skill.relations.conflicts_with.join(", "));
            }
            if !skill.relations.recommends.is_empty() {
                println!("recommends: {}", skill.relations.recommends.join(", "));
            }
            println!("layer:     {}", if skill.local { "local" } else { "shared" });
            if let Some(fork) = &skill.fork {
                println!(
                    "fork:      {} @ {} ({})",
                    fork.source_id, fork.hash, fork.copied_at
                );
            }
            if !args.meta_only {
                println!();
                println!("{}", read_skill_body(skill)?);
            }
        }
    }
    Ok(())
}
