//! Write a synthesized artifact to disk.
//!
//! Every file is first staged next to its destination. Only when all files
//! are staged are they renamed into place, so a failed write never leaves a
//! half-written project behind.

use std::fs;
use std::path::{Path, PathBuf};

use forge_core::{ForgeError, ForgeResult};
use tracing::{debug, warn};

use crate::artifact::Artifact;

/// Write every file of `artifact` under `out_dir`, creating directories as
/// needed. Returns the written paths in artifact order.
pub fn write_artifact(artifact: &Artifact, out_dir: &Path) -> ForgeResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|e| ForgeError::persistence(out_dir, e))?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
    for file in artifact.files() {
        let target = out_dir.join(&file.name);
        let staging = staging_path(&target);

        let result = match target.parent() {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|_| fs::write(&staging, &file.content));

        if let Err(e) = result {
            discard(&staged);
            return Err(ForgeError::persistence(target, e));
        }
        staged.push((staging, target));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (index, (staging, target)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(staging, target) {
            discard(&staged[index..]);
            return Err(ForgeError::persistence(target.clone(), e));
        }
        debug!(path = %target.display(), "Wrote file");
        written.push(target.clone());
    }

    Ok(written)
}

fn staging_path(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.forge-tmp", file_name))
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (staging, _) in staged {
        if let Err(e) = fs::remove_file(staging) {
            warn!(path = %staging.display(), error = %e, "Failed to remove staged file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use forge_core::Requirement;

    #[test]
    fn test_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/project");
        let artifact = build(&Requirement::new("Demo Bot", "test").with_plugin("a2a")).unwrap();

        let written = write_artifact(&artifact, &out).unwrap();

        assert_eq!(written.len(), 6);
        for file in artifact.files() {
            let on_disk = fs::read_to_string(out.join(&file.name)).unwrap();
            assert_eq!(on_disk, file.content);
        }
        let leftovers: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".forge-tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_entry_point_only_written_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = build(&Requirement::new("Demo Bot", "test")).unwrap();

        write_artifact(&artifact, dir.path()).unwrap();

        assert!(dir.path().join("demo_bot.py").exists());
        assert!(dir.path().join(".env").exists());
        assert!(!dir.path().join("__main__.py").exists());
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = build(&Requirement::new("Demo Bot", "test")).unwrap();

        let first = write_artifact(&artifact, dir.path()).unwrap();
        let second = write_artifact(&artifact, dir.path()).unwrap();

        assert_eq!(first, second);
        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert_eq!(readme, artifact.readme_file.content);
    }

    #[test]
    fn test_failed_staging_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the readme would be staged makes that write fail
        // after every other file was staged.
        fs::create_dir(dir.path().join(".README.md.forge-tmp")).unwrap();
        let artifact = build(&Requirement::new("Demo Bot", "test")).unwrap();

        let err = write_artifact(&artifact, dir.path()).unwrap_err();

        assert!(matches!(err, ForgeError::Persistence { .. }));
        assert!(!dir.path().join("demo_bot.py").exists());
        assert!(!dir.path().join("pyproject.toml").exists());
        assert!(!dir.path().join(".demo_bot.py.forge-tmp").exists());
        assert!(!dir.path().join(".env.forge-tmp").exists());
    }

    #[test]
    fn test_output_dir_that_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        fs::write(&blocker, "not a directory").unwrap();
        let artifact = build(&Requirement::new("Demo Bot", "test")).unwrap();

        let err = write_artifact(&artifact, &blocker).unwrap_err();
        assert!(matches!(err, ForgeError::Persistence { .. }));
    }
}
