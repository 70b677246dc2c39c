//! Unified diff of the class files before and after migration.
//!
//! Both trees are written under a scratch directory and compared with the
//! system `diff -ru`, run from inside it so the headers read
//! `original/Cat.spx` and `migrated/Cat.spx`.

use spx_migrator_core::FileSet;
use std::fs;
use std::path::Path;
use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub(crate) enum DiffError {
    #[error("failed to prepare diff workspace: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to run diff: {0}")]
    Spawn(std::io::Error),

    #[error("diff exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

/// Diff the `.spx` files of `original` and `migrated`; empty when they match.
pub(crate) fn generate_diff(original: &FileSet, migrated: &FileSet) -> Result<String, DiffError> {
    let dir = tempfile::tempdir()?;
    write_class_files(&dir.path().join("original"), original)?;
    write_class_files(&dir.path().join("migrated"), migrated)?;

    let output = Command::new("diff")
        .args(["-ru", "original", "migrated"])
        .current_dir(dir.path())
        .output()
        .map_err(DiffError::Spawn)?;
    // 0: identical, 1: differences, anything else is trouble.
    match output.status.code() {
        Some(0) | Some(1) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
        code => Err(DiffError::Failed {
            code: code.unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
        }),
    }
}

fn write_class_files(root: &Path, files: &FileSet) -> std::io::Result<()> {
    fs::create_dir_all(root)?;
    for (name, content) in files {
        if !name.ends_with(".spx") || name.split('/').any(|seg| seg == "..") {
            continue;
        }
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn files(entries: &[(&str, &str)]) -> FileSet {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect()
    }

    #[test]
    fn changed_class_files_show_up() {
        let before = files(&[
            ("main.spx", "play bgm\n"),
            ("Cat.spx", "say \"hi\"\n"),
            ("assets/index.json", "{}"),
        ]);
        let after = files(&[
            ("main.spx", "play \"bgm\"\n"),
            ("Cat.spx", "say \"hi\"\n"),
            ("assets/index.json", "{\"changed\": true}"),
        ]);
        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("original/main.spx"), "{diff}");
        assert!(diff.contains("-play bgm"), "{diff}");
        assert!(diff.contains("+play \"bgm\""), "{diff}");
        assert!(!diff.contains("Cat.spx"), "{diff}");
        assert!(!diff.contains("index.json"), "{diff}");
    }

    #[test]
    fn identical_projects_give_an_empty_diff() {
        let same = files(&[("main.spx", "play \"bgm\"\n")]);
        assert_eq!(generate_diff(&same, &same).unwrap(), "");
    }
}
