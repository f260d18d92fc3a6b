//! sw validate - Validate the project's skill selection

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::cli::output::{print_issue_list, print_load_warnings};
use crate::error::{Result, SwError};
use crate::resolve::selection_from_project;
use crate::validate::validate_selection;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Validate these skills instead of the configured selection
    #[arg(long, short)]
    pub skills: Vec<String>,

    /// Downgrade category/conflict errors to warnings for this run
    #[arg(long)]
    pub expert: bool,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    let (matrix, warnings) = ctx.load_matrix()?;
    print_load_warnings(&warnings);

    let selection = if args.skills.is_empty() {
        selection_from_project(&matrix, &ctx.config)?
    } else {
        matrix.resolve_names(&args.skills)
    };
    let expert = args.expert || ctx.config.expert;
    let report = validate_selection(&matrix, &selection, expert);

    match ctx.output_format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "status": if report.valid { "ok" } else { "invalid" },
                "selection": &selection,
                "valid": report.valid,
                "errors": &report.errors,
                "warnings": &report.warnings,
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        _ => {
            println!("selection: {}", selection.join(", "));
            if report.errors.is_empty() && report.warnings.is_empty() {
                println!("{}", "selection is valid".green().bold());
            }
            print_issue_list("error", &report.errors, true);
            print_issue_list("warning", &report.warnings, false);
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(SwError::SelectionInvalid(report.errors.len()))
    }
}
