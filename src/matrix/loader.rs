//! Layer loading for the skill matrix.
//!
//! Two layers feed one merge: the shared source root (local directory or a
//! previously fetched cache) and the project's `.sw` override directory.
//! Per-skill document reads run in parallel; the merge step is commutative
//! per identifier, so read ordering has no effect on the result.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, SwError};
use crate::matrix::parser::{self, MatrixDoc};
use crate::matrix::types::{Category, Matrix, Skill, Stack};

/// A non-fatal problem found while loading a layer. Malformed skill
/// directories are reported and skipped, never silently dropped.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadWarning {
    pub path: PathBuf,
    pub message: String,
}

/// One source layer before merging.
#[derive(Debug, Default)]
pub struct LoadedLayer {
    pub skills: std::collections::BTreeMap<String, Skill>,
    pub categories: std::collections::BTreeMap<String, Category>,
    pub stacks: std::collections::BTreeMap<String, Stack>,
    pub warnings: Vec<LoadWarning>,
}

/// Both layers of one resolution pass.
#[derive(Debug)]
pub struct MatrixLayers {
    pub shared: LoadedLayer,
    pub local: Option<LoadedLayer>,
}

impl MatrixLayers {
    /// Merge into the final matrix. Local entries fully replace shared
    /// entries with the same identifier.
    pub fn merge(self) -> (Matrix, Vec<LoadWarning>) {
        super::merge::merge_layers(self.shared, self.local)
    }
}

/// Resolve the shared source root: an explicit path from project config,
/// the `SW_SOURCE` environment variable, or the user-level cache populated
/// by an earlier fetch. Fails with `SourceUnreachable` when none of the
/// candidates is a readable directory.
pub fn resolve_source_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let mut tried = Vec::new();

    if let Some(path) = explicit {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
        return Err(SwError::SourceUnreachable(format!(
            "configured source {} is not a readable directory",
            path.display()
        )));
    }

    if let Ok(env_root) = std::env::var("SW_SOURCE") {
        let path = PathBuf::from(&env_root);
        if path.is_dir() {
            return Ok(path);
        }
        tried.push(path);
    }

    if let Some(data_dir) = dirs::data_dir() {
        let cached = data_dir.join("sw/source");
        if cached.is_dir() {
            return Ok(cached);
        }
        tried.push(cached);
    }

    Err(SwError::SourceUnreachable(format!(
        "no source root found (tried: {})",
        tried.iter().map(|p| p.display().to_string()).join(", ")
    )))
}

/// Load one layer from a root directory. The root holds `skills/` and an
/// optional `matrix.toml`. For the shared layer an unreadable root is
/// fatal; callers pass `required = false` for the project override layer.
pub fn load_layer(root: &Path, local: bool, required: bool) -> Result<LoadedLayer> {
    let mut layer = LoadedLayer::default();
    let skills_dir = root.join("skills");

    if required && !skills_dir.is_dir() {
        return Err(SwError::SourceUnreachable(format!(
            "cannot read skill source at {}",
            root.display()
        )));
    }
    if !root.is_dir() {
        debug!(target: "loader", root = %root.display(), "no override layer present");
        return Ok(layer);
    }

    if skills_dir.is_dir() {
        load_skill_dirs(&skills_dir, local, &mut layer)?;
    }

    let matrix_doc_path = root.join("matrix.toml");
    if matrix_doc_path.is_file() {
        let doc = MatrixDoc::parse_path(&matrix_doc_path)?;
        for category in doc.categories {
            layer.categories.insert(category.id.clone(), category);
        }
        for stack in doc.stacks {
            layer.stacks.insert(stack.id.clone(), stack);
        }
    }

    debug!(
        target: "loader",
        root = %root.display(),
        skills = layer.skills.len(),
        categories = layer.categories.len(),
        stacks = layer.stacks.len(),
        warnings = layer.warnings.len(),
        "layer loaded"
    );

    Ok(layer)
}

fn load_skill_dirs(skills_dir: &Path, local: bool, layer: &mut LoadedLayer) -> Result<()> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(skills_dir)
        .map_err(|err| {
            SwError::SourceUnreachable(format!("read {}: {err}", skills_dir.display()))
        })?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            // Dot-directories hold locks and staging areas, not skills.
            path.is_dir()
                && path
                    .file_name()
                    .is_some_and(|name| !name.to_string_lossy().starts_with('.'))
        })
        .collect();
    dirs.sort();

    // Parallel document reads; ordering is restored by the id-sorted map.
    let parsed: Vec<std::result::Result<Skill, LoadWarning>> = dirs
        .par_iter()
        .map(|dir| {
            parser::parse_skill_dir(dir, local).map_err(|err| LoadWarning {
                path: dir.clone(),
                message: err.to_string(),
            })
        })
        .collect();

    for item in parsed {
        match item {
            Ok(skill) => {
                if let Some(existing) = layer.skills.get(&skill.id) {
                    layer.warnings.push(LoadWarning {
                        path: skill.doc_path.clone(),
                        message: format!(
                            "duplicate skill id '{}' (already defined at {}); keeping the first",
                            skill.id,
                            existing.doc_path.display()
                        ),
                    });
                } else {
                    layer.skills.insert(skill.id.clone(), skill);
                }
            }
            Err(warning) => layer.warnings.push(warning),
        }
    }

    Ok(())
}

/// Load the shared layer and, when a project directory is given, the local
/// override layer from `<project>/skills` and `<project>/matrix.toml`.
pub fn load_layers(source_root: &Path, project_dir: Option<&Path>) -> Result<MatrixLayers> {
    let shared = load_layer(source_root, false, true)?;
    let local = match project_dir {
        Some(dir) => Some(load_layer(dir, true, false)?),
        None => None,
    };
    Ok(MatrixLayers { shared, local })
}
