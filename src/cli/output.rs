//! Small output helpers shared by command implementations.

use colored::Colorize;

use crate::matrix::LoadWarning;
use crate::validate::ValidationIssue;

/// Print loader warnings to stderr so stdout stays machine-parseable.
pub fn print_load_warnings(warnings: &[LoadWarning]) {
    for warning in warnings {
        eprintln!(
            "{} {} ({})",
            "warning:".yellow().bold(),
            warning.message,
            warning.path.display()
        );
    }
}

pub fn print_issue_list(label: &str, issues: &[ValidationIssue], error: bool) {
    for issue in issues {
        let prefix = if error {
            format!("{label}:").red().bold()
        } else {
            format!("{label}:").yellow().bold()
        };
        println!("  {prefix} {issue}");
    }
}

/// The terminal width, defaulting to 80 when detection fails.
#[must_use]
pub fn terminal_width() -> usize {
    crossterm::terminal::size().map_or(80, |(w, _)| w as usize)
}
