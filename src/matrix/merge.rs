//! Layer merging.
//!
//! Shared-source entries load first, local entries second; for every
//! identifier present in both, the local entry fully replaces the shared
//! one (no field-level merge). Alias tables are unioned with the local
//! source winning collisions.

use std::collections::BTreeMap;

use tracing::debug;

use crate::matrix::loader::{LoadWarning, LoadedLayer};
use crate::matrix::types::Matrix;

/// Merge the shared layer with an optional local override layer into the
/// immutable matrix snapshot for one resolution pass.
#[must_use]
pub fn merge_layers(shared: LoadedLayer, local: Option<LoadedLayer>) -> (Matrix, Vec<LoadWarning>) {
    let mut warnings = Vec::new();
    let mut matrix = Matrix::default();

    let LoadedLayer {
        skills,
        categories,
        stacks,
        warnings: shared_warnings,
    } = shared;
    warnings.extend(shared_warnings);
    matrix.skills = skills;
    matrix.categories = categories;
    matrix.stacks = stacks;

    if let Some(local) = local {
        let LoadedLayer {
            skills,
            categories,
            stacks,
            warnings: local_warnings,
        } = local;
        warnings.extend(local_warnings);

        for (id, mut skill) in skills {
            skill.local = true;
            if matrix.skills.insert(id.clone(), skill).is_some() {
                debug!(target: "merge", id = %id, "local skill shadows shared entry");
            }
        }
        for (id, category) in categories {
            matrix.categories.insert(id, category);
        }
        for (id, stack) in stacks {
            matrix.stacks.insert(id, stack);
        }
    }

    matrix.aliases = build_alias_table(&matrix, &mut warnings);

    (matrix, warnings)
}

/// Build the single alias -> canonical-id table consulted by every
/// downstream component. Local skills win collisions; within one layer the
/// first id in sorted order wins and the collision is reported.
fn build_alias_table(matrix: &Matrix, warnings: &mut Vec<LoadWarning>) -> BTreeMap<String, String> {
    let mut aliases: BTreeMap<String, String> = BTreeMap::new();
    let mut owners: BTreeMap<String, bool> = BTreeMap::new();

    for skill in matrix.skills.values() {
        let Some(alias) = &skill.alias else { continue };
        match owners.get(alias) {
            None => {
                aliases.insert(alias.clone(), skill.id.clone());
                owners.insert(alias.clone(), skill.local);
            }
            Some(owner_is_local) => {
                if skill.local && !owner_is_local {
                    aliases.insert(alias.clone(), skill.id.clone());
                    owners.insert(alias.clone(), true);
                } else {
                    warnings.push(LoadWarning {
                        path: skill.doc_path.clone(),
                        message: format!(
                            "alias '{}' on skill '{}' collides with skill '{}'; keeping the latter",
                            alias, skill.id, aliases[alias]
                        ),
                    });
                }
            }
        }
    }

    aliases
}
