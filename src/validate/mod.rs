//! Selection validation.
//!
//! Checks a candidate, alias-resolved skill selection against the merged
//! matrix: unknown identifiers, exclusive-category collisions, declared
//! conflicts, missing dependencies, and unmet recommendations. Failures are
//! accumulated, never short-circuited, so one pass reports every problem.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::matrix::Matrix;

/// One validation finding. Every variant carries the offending
/// identifier(s) and, for dependency/conflict findings, the full list of
/// competing or missing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationIssue {
    SkillNotFound {
        id: String,
    },
    CategoryConflict {
        category: String,
        skills: Vec<String>,
    },
    SkillConflict {
        skill: String,
        conflicts: Vec<String>,
    },
    MissingDependency {
        skill: String,
        missing: Vec<String>,
    },
    RecommendationUnmet {
        skill: String,
        missing: Vec<String>,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkillNotFound { id } => write!(f, "unknown skill '{id}'"),
            Self::CategoryConflict { category, skills } => write!(
                f,
                "category '{category}' is exclusive but the selection contains {}",
                skills.join(", ")
            ),
            Self::SkillConflict { skill, conflicts } => write!(
                f,
                "skill '{skill}' conflicts with selected {}",
                conflicts.join(", ")
            ),
            Self::MissingDependency { skill, missing } => write!(
                f,
                "skill '{skill}' requires unselected {}",
                missing.join(", ")
            ),
            Self::RecommendationUnmet { skill, missing } => write!(
                f,
                "skill '{skill}' recommends {}",
                missing.join(", ")
            ),
        }
    }
}

/// The outcome of one validation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a candidate selection of canonical skill ids.
///
/// Rules run in a fixed order: unknown ids, exclusive-category collisions,
/// declared conflicts, missing requirements, unmet recommendations. Expert
/// mode downgrades category and conflict findings to warnings; unknown ids
/// and missing requirements never downgrade.
#[must_use]
pub fn validate_selection(matrix: &Matrix, selection: &[String], expert: bool) -> ValidationReport {
    let mut report = ValidationReport::default();
    let selected: BTreeSet<&str> = selection.iter().map(String::as_str).collect();

    // Rule 1: unknown identifiers.
    let known: Vec<&str> = selection
        .iter()
        .map(String::as_str)
        .filter(|id| {
            if matrix.skill(id).is_some() {
                true
            } else {
                report.errors.push(ValidationIssue::SkillNotFound {
                    id: (*id).to_string(),
                });
                false
            }
        })
        .collect();

    // Rule 2: two or more selected skills in one exclusive category.
    let mut by_category: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for id in &known {
        let Some(skill) = matrix.skill(id) else { continue };
        by_category.entry(skill.category.as_str()).or_default().push(id);
    }
    for (category, members) in by_category {
        let exclusive = matrix.category(category).is_some_and(|c| c.exclusive);
        if exclusive && members.len() > 1 {
            let issue = ValidationIssue::CategoryConflict {
                category: category.to_string(),
                skills: members.iter().map(ToString::to_string).collect(),
            };
            if expert {
                report.warnings.push(issue);
            } else {
                report.errors.push(issue);
            }
        }
    }

    // Rule 3: declared conflicts intersecting the selection.
    for id in &known {
        let Some(skill) = matrix.skill(id) else { continue };
        let conflicts: Vec<String> = skill
            .relations
            .conflicts_with
            .iter()
            .filter(|other| selected.contains(other.as_str()))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            let issue = ValidationIssue::SkillConflict {
                skill: (*id).to_string(),
                conflicts,
            };
            if expert {
                report.warnings.push(issue);
            } else {
                report.errors.push(issue);
            }
        }
    }

    // Rule 4: requires must be a subset of the selection. Never downgraded.
    for id in &known {
        let Some(skill) = matrix.skill(id) else { continue };
        let missing: Vec<String> = skill
            .relations
            .requires
            .iter()
            .filter(|dep| !selected.contains(dep.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            report.errors.push(ValidationIssue::MissingDependency {
                skill: (*id).to_string(),
                missing,
            });
        }
    }

    // Rule 5: unmet recommendations are always warnings.
    for id in &known {
        let Some(skill) = matrix.skill(id) else { continue };
        let missing: Vec<String> = skill
            .relations
            .recommends
            .iter()
            .filter(|rec| !selected.contains(rec.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            report.warnings.push(ValidationIssue::RecommendationUnmet {
                skill: (*id).to_string(),
                missing,
            });
        }
    }

    report.valid = report.errors.is_empty();
    report
}
