//! sw list - List skills in the merged matrix

use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::print_load_warnings;
use crate::error::Result;
use crate::matrix::Skill;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by tags (any match)
    #[arg(long, short)]
    pub tags: Vec<String>,

    /// Filter by category id
    #[arg(long)]
    pub category: Option<String>,

    /// Only local (project-override) skills
    #[arg(long)]
    pub local: bool,

    /// Maximum number of skills to show
    #[arg(long, short = 'n', default_value = "100")]
    pub limit: usize,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let (matrix, warnings) = ctx.load_matrix()?;
    print_load_warnings(&warnings);

    let skills: Vec<&Skill> = matrix
        .skills
        .values()
        .filter(|s| args.category.as_ref().is_none_or(|c| &s.category == c))
        .filter(|s| !args.local || s.local)
        .filter(|s| {
            args.tags.is_empty() || args.tags.iter().any(|t| s.tags.contains(t))
        })
        .take(args.limit)
        .collect();

    debug!(target: "list", count = skills.len(), "listing skills");
    display_list(ctx, &skills);
    Ok(())
}

/// Serializable skill entry for JSON/JSONL output
#[derive(Debug, Serialize)]
struct SkillEntry<'a> {
    id: &'a str,
    alias: Option<&'a str>,
    name: &'a str,
    description: &'a str,
    category: &'a str,
    version: Option<&'a str>,
    tags: &'a [String],
    local: bool,
}

impl<'a> From<&'a Skill> for SkillEntry<'a> {
    fn from(s: &'a Skill) -> Self {
        Self {
            id: &s.id,
            alias: s.alias.as_deref(),
            name: &s.name,
            description: &s.description,
            category: &s.category,
            version: s.version.as_deref(),
            tags: &s.tags,
            local: s.local,
        }
    }
}

fn display_list(ctx: &AppContext, skills: &[&Skill]) {
    match ctx.output_format {
        OutputFormat::Human => display_list_human(skills),
        OutputFormat::Json => {
            let entries: Vec<SkillEntry> = skills.iter().map(|s| SkillEntry::from(*s)).collect();
            let output = serde_json::json!({
                "status": "ok",
                "count": entries.len(),
                "skills": entries
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
        }
        OutputFormat::Jsonl => {
            for skill in skills {
                let entry = SkillEntry::from(*skill);
                println!("{}", serde_json::to_string(&entry).unwrap_or_default());
            }
        }
        OutputFormat::Plain => {
            // ID<TAB>CATEGORY<TAB>TAGS, no headers
            for skill in skills {
                println!("{}\t{}\t{}", skill.id, skill.category, skill.tags.join(","));
            }
        }
        OutputFormat::Tsv => {
            println!("id\talias\tcategory\tversion\tlayer");
            for skill in skills {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    skill.id,
                    skill.alias.as_deref().unwrap_or("-"),
                    skill.category,
                    skill.version.as_deref().unwrap_or("-"),
                    if skill.local { "local" } else { "shared" }
                );
            }
        }
    }
}

fn display_list_human(skills: &[&Skill]) {
    if skills.is_empty() {
        println!("No skills found");
        println!();
        println!("Point `source` in project.toml (or SW_SOURCE) at a skill source");
        return;
    }

    println!("{:28} {:8} {:22} {:8}", "ID", "ALIAS", "CATEGORY", "LAYER");
    println!("{}", "─".repeat(70));

    for skill in skills {
        // Truncate IDs by chars, not bytes.
        let id_display = if skill.id.chars().count() > 26 {
            format!("{}…", skill.id.chars().take(25).collect::<String>())
        } else {
            skill.id.clone()
        };
        println!(
            "{:28} {:8} {:22} {:8}",
            id_display,
            skill.alias.as_deref().unwrap_or("-"),
            skill.category,
            if skill.local { "local" } else { "shared" }
        );
    }

    println!();
    println!("Total: {} skills", skills.len());
}
