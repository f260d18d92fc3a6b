//! Error types for sw.

use std::path::PathBuf;

use itertools::Itertools;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwError>;

#[derive(Debug, Error)]
pub enum SwError {
    /// The shared skill source cannot be read and no cached copy exists.
    /// Fatal for the whole pipeline: no partial matrix is usable.
    #[error("skill source unreachable: {0}")]
    SourceUnreachable(String),

    #[error("invalid skill: {0}")]
    InvalidSkill(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("missing config: {0}")]
    MissingConfig(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The selection failed validation. Individual issues are reported by
    /// the validator before this is returned; the count is for exit status.
    #[error("selection invalid: {0} error(s)")]
    SelectionInvalid(usize),

    #[error("unknown stack: {0}")]
    StackNotFound(String),

    #[error("unknown agent: {0}")]
    AgentNotFound(String),

    /// No output-format template exists for an agent. Fatal for that agent
    /// only; sibling agents still compile.
    #[error("no output-format template for agent '{agent}' (tried: {})", format_tried(.tried))]
    MissingTemplate { agent: String, tried: Vec<PathBuf> },

    #[error("template error: {0}")]
    Template(String),

    /// A skill copy failed. Fatal for that skill only; provenance is left
    /// unmodified and the rest of the batch continues.
    #[error("copy failed for skill '{skill}': {reason}")]
    CopyFailure { skill: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried.iter().map(|p| p.display().to_string()).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_template_lists_candidates() {
        let err = SwError::MissingTemplate {
            agent: "writer".to_string(),
            tried: vec![
                PathBuf::from("/a/output-format.md"),
                PathBuf::from("/b/output-format.md"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("writer"));
        assert!(text.contains("/a/output-format.md"));
        assert!(text.contains("/b/output-format.md"));
    }

    #[test]
    fn copy_failure_names_skill() {
        let err = SwError::CopyFailure {
            skill: "axum".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("axum"));
        assert!(err.to_string().contains("disk full"));
    }
}
