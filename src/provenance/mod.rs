//! Fork provenance tracking.
//!
//! When a shared skill is copied into a project, the copy records the
//! source document's content hash. Status checks later recompute the
//! source hash and classify the local copy as current, outdated, or
//! local-only. Records are only ever rewritten after a copy has fully
//! succeeded; a failed copy leaves the previous record intact.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, SwError};
use crate::matrix::parser::SkillMeta;
use crate::matrix::types::Skill;
use crate::utils::fs::{copy_tree, ensure_dir};

/// Provenance metadata persisted alongside a copied skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkRecord {
    /// Identifier of the upstream skill this copy came from.
    pub source_id: String,
    /// Content hash of the upstream primary document at copy time.
    pub hash: String,
    pub copied_at: DateTime<Utc>,
}

/// Classification of a local copy against its upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForkStatus {
    /// Hashes match; the local copy mirrors upstream.
    Current,
    /// Upstream has changed since the copy was taken.
    Outdated,
    /// No fork record, or the recorded source no longer exists upstream.
    LocalOnly,
}

impl std::fmt::Display for ForkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Outdated => write!(f, "outdated"),
            Self::LocalOnly => write!(f, "local-only"),
        }
    }
}

/// Hash a document's bytes. Stable across runs and platforms.
pub fn hash_document(path: &Path) -> Result<String> {
    let data = std::fs::read(path)
        .map_err(|err| SwError::InvalidSkill(format!("read {}: {err}", path.display())))?;
    Ok(hash_bytes(&data))
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    format!("sha256:{}", hex::encode(digest))
}

/// Classify a local copy. A missing record or a vanished upstream source
/// (including a skill renamed upstream) is local-only, never a guess.
#[must_use]
pub fn compare(record: Option<&ForkRecord>, current_source_hash: Option<&str>) -> ForkStatus {
    match (record, current_source_hash) {
        (None, _) | (Some(_), None) => ForkStatus::LocalOnly,
        (Some(record), Some(current)) => {
            if record.hash == current {
                ForkStatus::Current
            } else {
                ForkStatus::Outdated
            }
        }
    }
}

/// Compute the source document's hash and write a fork record into the
/// copied skill's metadata document at `dest_dir/skill.toml`.
pub fn record_fork(skill_id: &str, source_doc: &Path, dest_dir: &Path) -> Result<ForkRecord> {
    let record = ForkRecord {
        source_id: skill_id.to_string(),
        hash: hash_document(source_doc)?,
        copied_at: Utc::now(),
    };

    let meta_path = dest_dir.join("skill.toml");
    let mut meta = SkillMeta::parse_path(&meta_path)?;
    meta.fork = Some(record.clone());
    meta.write_path(&meta_path)?;

    debug!(target: "provenance", skill = %skill_id, hash = %record.hash, "fork recorded");
    Ok(record)
}

/// Result of a batch copy: what landed, what failed, and whether the batch
/// stopped early on an abort signal. Failures never abort siblings.
#[derive(Debug, Default)]
pub struct CopyOutcome {
    pub copied: Vec<String>,
    pub failures: Vec<(String, SwError)>,
    pub aborted: bool,
}

/// Copy one shared skill into `dest_root/<id>`, recording provenance.
///
/// The copy is all-or-nothing: files are staged into a temporary directory
/// beside the destination and swapped in with renames, under an advisory
/// per-destination lock. An existing destination requires `force`.
pub fn copy_skill(skill: &Skill, dest_root: &Path, force: bool) -> Result<ForkRecord> {
    let dest = dest_root.join(&skill.id);
    if dest.exists() && !force {
        return Err(SwError::CopyFailure {
            skill: skill.id.clone(),
            reason: format!("{} already exists (use --force to overwrite)", dest.display()),
        });
    }

    let source_dir = skill.doc_path.parent().ok_or_else(|| SwError::CopyFailure {
        skill: skill.id.clone(),
        reason: "skill document has no parent directory".to_string(),
    })?;

    ensure_dir(dest_root)?;
    let _lock = DestLock::acquire(dest_root, &skill.id)?;

    // Stage the full copy first; nothing at the destination changes until
    // the staged tree is complete.
    let staging = tempfile::Builder::new()
        .prefix(&format!(".{}-staging-", skill.id))
        .tempdir_in(dest_root)
        .map_err(|err| SwError::CopyFailure {
            skill: skill.id.clone(),
            reason: format!("create staging dir: {err}"),
        })?;

    copy_tree(source_dir, staging.path()).map_err(|err| SwError::CopyFailure {
        skill: skill.id.clone(),
        reason: err.to_string(),
    })?;

    let record = ForkRecord {
        source_id: skill.id.clone(),
        hash: hash_document(&skill.doc_path).map_err(|err| SwError::CopyFailure {
            skill: skill.id.clone(),
            reason: err.to_string(),
        })?,
        copied_at: Utc::now(),
    };
    let staged_meta_path = staging.path().join("skill.toml");
    let mut meta = SkillMeta::parse_path(&staged_meta_path)?;
    meta.fork = Some(record.clone());
    meta.write_path(&staged_meta_path)?;

    let staged = staging.keep();
    swap_into_place(&staged, &dest).map_err(|err| {
        let _ = std::fs::remove_dir_all(&staged);
        SwError::CopyFailure {
            skill: skill.id.clone(),
            reason: err.to_string(),
        }
    })?;

    info!(target: "provenance", skill = %skill.id, dest = %dest.display(), "skill copied");
    Ok(record)
}

/// Copy a batch of skills. The abort flag is checked between skills so a
/// cancelled batch stops cleanly with already-copied skills left intact.
pub fn copy_skills(
    skills: &[&Skill],
    dest_root: &Path,
    force: bool,
    abort: &AtomicBool,
) -> CopyOutcome {
    let mut outcome = CopyOutcome::default();
    for skill in skills {
        if abort.load(Ordering::SeqCst) {
            outcome.aborted = true;
            break;
        }
        match copy_skill(skill, dest_root, force) {
            Ok(_) => outcome.copied.push(skill.id.clone()),
            Err(err) => outcome.failures.push((skill.id.clone(), err)),
        }
    }
    outcome
}

/// Refresh a local copy from its upstream source. Equivalent to a forced
/// copy: the record is rewritten with the new hash and date only after the
/// staged copy has swapped in, so a failed update cannot corrupt the
/// previous record.
pub fn update_skill(upstream: &Skill, dest_root: &Path) -> Result<ForkRecord> {
    copy_skill(upstream, dest_root, true)
}

/// Provenance classification for one local skill.
#[derive(Debug, Clone, Serialize)]
pub struct SkillProvenance {
    pub id: String,
    pub status: ForkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ForkRecord>,
}

/// Classify every local skill against the shared layer.
pub fn status_report(
    shared: &std::collections::BTreeMap<String, Skill>,
    local: &std::collections::BTreeMap<String, Skill>,
) -> Result<Vec<SkillProvenance>> {
    let mut report = Vec::new();
    for skill in local.values() {
        let current_hash = match &skill.fork {
            Some(record) => match shared.get(&record.source_id) {
                Some(upstream) => Some(hash_document(&upstream.doc_path)?),
                None => None,
            },
            None => None,
        };
        report.push(SkillProvenance {
            id: skill.id.clone(),
            status: compare(skill.fork.as_ref(), current_hash.as_deref()),
            record: skill.fork.clone(),
        });
    }
    Ok(report)
}

/// Advisory lock serializing writes to one destination skill directory.
struct DestLock {
    file: std::fs::File,
    path: PathBuf,
}

impl DestLock {
    fn acquire(dest_root: &Path, skill_id: &str) -> Result<Self> {
        let locks_dir = dest_root.join(".locks");
        ensure_dir(&locks_dir)?;
        let path = locks_dir.join(format!("{skill_id}.lock"));
        let file = std::fs::File::create(&path).map_err(|err| SwError::CopyFailure {
            skill: skill_id.to_string(),
            reason: format!("create lock {}: {err}", path.display()),
        })?;
        file.lock_exclusive().map_err(|err| SwError::CopyFailure {
            skill: skill_id.to_string(),
            reason: format!("lock {}: {err}", path.display()),
        })?;
        Ok(Self { file, path })
    }
}

impl Drop for DestLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Swap a staged directory into place. An existing destination is renamed
/// aside first and restored if the swap fails.
fn swap_into_place(staged: &Path, dest: &Path) -> std::io::Result<()> {
    if dest.exists() {
        let name = dest.file_name().map_or_else(
            || "dest".to_string(),
            |n| n.to_string_lossy().to_string(),
        );
        let backup = dest.with_file_name(format!(".{name}.old"));
        if backup.exists() {
            std::fs::remove_dir_all(&backup)?;
        }
        std::fs::rename(dest, &backup)?;
        if let Err(err) = std::fs::rename(staged, dest) {
            let _ = std::fs::rename(&backup, dest);
            return Err(err);
        }
        std::fs::remove_dir_all(&backup)?;
    } else {
        std::fs::rename(staged, dest)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::parser::parse_skill_dir;
    use tempfile::tempdir;

    fn write_skill(root: &Path, id: &str, body: &str) -> Skill {
        let dir = root.join("skills").join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("skill.md"),
            format!("---\nname: {id}\ndescription: d\n---\n{body}\n"),
        )
        .unwrap();
        std::fs::write(
            dir.join("skill.toml"),
            format!("id = \"{id}\"\ncategory = \"misc\"\n"),
        )
        .unwrap();
        parse_skill_dir(&dir, false).unwrap()
    }

    #[test]
    fn hash_is_stable_and_prefixed() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("doc.md");
        std::fs::write(&path, "content").unwrap();
        let first = hash_document(&path).unwrap();
        let second = hash_document(&path).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("sha256:"));
    }

    #[test]
    fn record_then_compare_is_current() {
        let tmp = tempdir().unwrap();
        let skill = write_skill(tmp.path(), "axum", "body");
        let dest_root = tmp.path().join("local/skills");

        let record = copy_skill(&skill, &dest_root, false).unwrap();
        let current = hash_document(&skill.doc_path).unwrap();
        assert_eq!(compare(Some(&record), Some(&current)), ForkStatus::Current);
    }

    #[test]
    fn upstream_change_flips_to_outdated_and_update_restores_current() {
        let tmp = tempdir().unwrap();
        let skill = write_skill(tmp.path(), "axum", "v1");
        let dest_root = tmp.path().join("local/skills");

        let record = copy_skill(&skill, &dest_root, false).unwrap();

        // Upstream moves on.
        std::fs::write(
            &skill.doc_path,
            "---\nname: axum\ndescription: d\n---\nv2\n",
        )
        .unwrap();
        let h2 = hash_document(&skill.doc_path).unwrap();
        assert_eq!(compare(Some(&record), Some(&h2)), ForkStatus::Outdated);

        let updated = update_skill(&skill, &dest_root).unwrap();
        assert_eq!(compare(Some(&updated), Some(&h2)), ForkStatus::Current);

        // The refreshed copy carries the new body and the new record.
        let local = parse_skill_dir(&dest_root.join("axum"), true).unwrap();
        assert_eq!(local.fork.unwrap().hash, h2);
        let body = std::fs::read_to_string(local.doc_path).unwrap();
        assert!(body.contains("v2"));
    }

    #[test]
    fn compare_without_record_is_local_only() {
        assert_eq!(compare(None, Some("sha256:abc")), ForkStatus::LocalOnly);
    }

    #[test]
    fn compare_with_vanished_upstream_is_local_only() {
        let record = ForkRecord {
            source_id: "renamed-away".to_string(),
            hash: "sha256:abc".to_string(),
            copied_at: Utc::now(),
        };
        assert_eq!(compare(Some(&record), None), ForkStatus::LocalOnly);
    }

    #[test]
    fn copy_refuses_existing_destination_without_force() {
        let tmp = tempdir().unwrap();
        let skill = write_skill(tmp.path(), "axum", "body");
        let dest_root = tmp.path().join("local/skills");

        copy_skill(&skill, &dest_root, false).unwrap();
        let err = copy_skill(&skill, &dest_root, false).unwrap_err();
        assert!(matches!(err, SwError::CopyFailure { .. }));
        assert!(err.to_string().contains("--force"));
    }

    #[test]
    fn failed_copy_leaves_previous_record_intact() {
        let tmp = tempdir().unwrap();
        let skill = write_skill(tmp.path(), "axum", "v1");
        let dest_root = tmp.path().join("local/skills");
        copy_skill(&skill, &dest_root, false).unwrap();
        let before = parse_skill_dir(&dest_root.join("axum"), true)
            .unwrap()
            .fork
            .unwrap();

        // Break the upstream so the staged copy cannot be completed.
        let mut broken = skill.clone();
        broken.doc_path = tmp.path().join("skills/axum/removed.md");
        let err = update_skill(&broken, &dest_root).unwrap_err();
        assert!(matches!(err, SwError::CopyFailure { .. } | SwError::InvalidSkill(_)));

        let after = parse_skill_dir(&dest_root.join("axum"), true)
            .unwrap()
            .fork
            .unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn batch_copy_continues_past_failures() {
        let tmp = tempdir().unwrap();
        let good = write_skill(tmp.path(), "good", "body");
        let mut bad = write_skill(tmp.path(), "bad", "body");
        bad.doc_path = tmp.path().join("skills/bad/missing.md");
        let dest_root = tmp.path().join("local/skills");

        let abort = AtomicBool::new(false);
        let outcome = copy_skills(&[&bad, &good], &dest_root, false, &abort);
        assert_eq!(outcome.copied, vec!["good"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "bad");
        assert!(!outcome.aborted);
    }

    #[test]
    fn abort_flag_stops_batch_between_skills() {
        let tmp = tempdir().unwrap();
        let a = write_skill(tmp.path(), "aaa", "body");
        let b = write_skill(tmp.path(), "bbb", "body");
        let dest_root = tmp.path().join("local/skills");

        let abort = AtomicBool::new(true);
        let outcome = copy_skills(&[&a, &b], &dest_root, false, &abort);
        assert!(outcome.aborted);
        assert!(outcome.copied.is_empty());
        assert!(!dest_root.join("aaa").exists());
    }

    #[test]
    fn record_fork_writes_into_destination_metadata() {
        let tmp = tempdir().unwrap();
        let skill = write_skill(tmp.path(), "axum", "body");

        // A bare copy without provenance, then an explicit record pass.
        let dest = tmp.path().join("local/skills/axum");
        copy_tree(skill.doc_path.parent().unwrap(), &dest).unwrap();
        let record = record_fork("axum", &skill.doc_path, &dest).unwrap();

        let meta = SkillMeta::parse_path(&dest.join("skill.toml")).unwrap();
        assert_eq!(meta.fork.unwrap(), record);
    }

    #[test]
    fn status_report_classifies_all_three_states() {
        let tmp = tempdir().unwrap();
        let upstream = write_skill(tmp.path(), "tracked", "v1");
        let _ = write_skill(tmp.path(), "untracked", "v1");
        let dest_root = tmp.path().join("local/skills");
        copy_skill(&upstream, &dest_root, false).unwrap();

        // A local-only skill written by hand, no record.
        let handmade = tmp.path().join("local");
        let _ = write_skill(&handmade, "handmade", "mine");

        let mut shared = std::collections::BTreeMap::new();
        shared.insert(upstream.id.clone(), upstream.clone());
        let mut local = std::collections::BTreeMap::new();
        for dir in ["tracked", "handmade"] {
            let skill = parse_skill_dir(&handmade.join("skills").join(dir), true)
                .or_else(|_| parse_skill_dir(&dest_root.join(dir), true))
                .unwrap();
            local.insert(skill.id.clone(), skill);
        }

        let report = status_report(&shared, &local).unwrap();
        let by_id: std::collections::BTreeMap<_, _> =
            report.iter().map(|s| (s.id.as_str(), s.status)).collect();
        assert_eq!(by_id["tracked"], ForkStatus::Current);
        assert_eq!(by_id["handmade"], ForkStatus::LocalOnly);
    }
}
