//! Filesystem utilities.

use std::path::{Path, PathBuf};

use crate::error::{Result, SwError};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path)
            .map_err(|err| SwError::Config(format!("create dir {}: {err}", path.display())))?;
    }
    Ok(())
}

/// Read a file to string, returning None if it doesn't exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    if path.exists() {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| SwError::Config(format!("read {}: {err}", path.display())))?;
        Ok(Some(raw))
    } else {
        Ok(None)
    }
}

/// Copy every regular file under `src` into `dest`, preserving relative
/// paths. Symlinks are skipped.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(src)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| SwError::Config(format!("strip prefix {}: {err}", src.display())))?;
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        std::fs::copy(entry.path(), &target).map_err(|err| {
            SwError::Config(format!(
                "copy {} -> {}: {err}",
                entry.path().display(),
                target.display()
            ))
        })?;
    }
    Ok(())
}

/// Search upwards from `start` for a directory named `name`.
pub fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
