//! Build validation against a pinned spx runtime version.
//!
//! The migrator validates twice: the input must build against
//! [`crate::LEGACY_VERSION`] before anything is rewritten, and the output
//! must build against [`crate::TARGET_VERSION`] afterwards.

use crate::error::ValidateError;
use crate::FileSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Checks that a file set builds against a given runtime version.
pub trait Validator {
    fn validate(&self, files: &FileSet, version: &str) -> Result<(), ValidateError>;
}

/// How [`CommandValidator`] lays out and builds the scratch module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Build tool executable.
    pub program: String,
    /// Argument lists, run in order in the scratch directory.
    pub steps: Vec<Vec<String>>,
    /// Module path written to `go.mod`.
    pub module_path: String,
    /// `go` directive written to `go.mod`.
    pub go_version: String,
    /// Module providing the spx runtime.
    pub runtime_module: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            program: "xgo".to_owned(),
            steps: vec![
                vec!["mod".to_owned(), "tidy".to_owned()],
                vec!["build".to_owned(), ".".to_owned()],
            ],
            module_path: "example.com/migrated".to_owned(),
            go_version: "1.24".to_owned(),
            runtime_module: "github.com/goplus/spx/v2".to_owned(),
        }
    }
}

impl ValidatorConfig {
    /// `go.mod` requiring the runtime at `version`.
    pub fn go_mod(&self, version: &str) -> String {
        format!(
            "module {}\n\ngo {}\n\nrequire {} {}\n",
            self.module_path, self.go_version, self.runtime_module, version
        )
    }
}

/// Writes the project into a temporary directory and runs the configured
/// build steps there. The directory is removed when validation returns.
#[derive(Debug, Clone, Default)]
pub struct CommandValidator {
    config: ValidatorConfig,
}

impl CommandValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        CommandValidator { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn run_step(&self, dir: &Path, args: &[String]) -> Result<(), ValidateError> {
        let command = std::iter::once(self.config.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        debug!(%command, dir = %dir.display(), "running validation step");

        let output = Command::new(&self.config.program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| ValidateError::Spawn {
                command: command.clone(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(ValidateError::CommandFailed {
            command,
            output: combined.trim_end().to_owned(),
        })
    }
}

impl Validator for CommandValidator {
    fn validate(&self, files: &FileSet, version: &str) -> Result<(), ValidateError> {
        let dir = tempfile::tempdir()?;
        for (path, content) in files {
            let target = dir.path().join(relative_path(path)?);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)?;
        }
        fs::write(dir.path().join("go.mod"), self.config.go_mod(version))?;

        for step in &self.config.steps {
            self.run_step(dir.path(), step)?;
        }
        Ok(())
    }
}

/// Accepts everything. For dry runs without the build toolchain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl Validator for NoopValidator {
    fn validate(&self, _files: &FileSet, _version: &str) -> Result<(), ValidateError> {
        Ok(())
    }
}

/// A project path that stays inside the scratch directory.
fn relative_path(path: &str) -> Result<PathBuf, ValidateError> {
    let p = Path::new(path);
    let inside = !path.is_empty()
        && p.components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if inside {
        Ok(p.to_path_buf())
    } else {
        Err(ValidateError::InvalidPath(path.to_owned()))
    }
}
