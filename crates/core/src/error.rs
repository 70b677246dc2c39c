use crate::removed_api::RemovedApisError;
use spx_syntax::ParseError;
use std::fmt;

/// A step of the migration pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    ScanResources,
    LegacyValidate,
    DetectRemovedApis,
    SoundCalls,
    AutoBindings,
    Costume,
    Effect,
    Backdrop,
    Layer,
    Broadcast,
    TouchStart,
    Movement,
    Animation,
    TargetValidate,
}

impl Stage {
    /// What the step does, phrased to follow "failed to".
    pub fn action(self) -> &'static str {
        match self {
            Stage::ScanResources => "scan resources",
            Stage::LegacyValidate => "validate with legacy spx version",
            Stage::DetectRemovedApis => "detect removed APIs",
            Stage::SoundCalls => "convert sound calls",
            Stage::AutoBindings => "remove auto-binding declarations",
            Stage::Costume => "convert costume APIs",
            Stage::Effect => "convert effect APIs",
            Stage::Backdrop => "convert backdrop APIs",
            Stage::Layer => "convert layer APIs",
            Stage::Broadcast => "convert broadcast APIs",
            Stage::TouchStart => "convert onTouchStart APIs",
            Stage::Movement => "convert movement APIs",
            Stage::Animation => "convert animation APIs",
            Stage::TargetValidate => "validate migrated project",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("unsupported project structure: no files under assets/")]
    UnsupportedStructure,
}

/// Failures of an individual rewrite pass. Unparseable files are skipped
/// rather than reported.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("main.spx not found")]
    EntryFileNotFound,

    /// The printer produced source that no longer parses.
    #[error("failed to format {path}: {source}")]
    Format { path: String, source: ParseError },
}

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("refusing to write project file outside the workspace: {0}")]
    InvalidPath(String),

    #[error("failed to prepare validation workspace: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed:\n{output}")]
    CommandFailed { command: String, output: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Pass(#[from] PassError),
    #[error(transparent)]
    Validate(#[from] ValidateError),
}

/// Everything [`crate::Migrator::run`] can fail with.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Nothing needed rewriting and the project already builds against the
    /// target version.
    #[error("project already compatible")]
    AlreadyCompatible,

    #[error(transparent)]
    RemovedApis(#[from] RemovedApisError),

    #[error("failed to {stage}: {source}")]
    Stage { stage: Stage, source: StageError },
}

impl MigrateError {
    pub fn stage(stage: Stage, source: impl Into<StageError>) -> Self {
        MigrateError::Stage {
            stage,
            source: source.into(),
        }
    }

    /// The step that failed, if the error came from one.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            MigrateError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_already_compatible(&self) -> bool {
        matches!(self, MigrateError::AlreadyCompatible)
    }

    pub fn is_removed_apis(&self) -> bool {
        matches!(self, MigrateError::RemovedApis(_))
    }

    pub fn is_legacy_validate(&self) -> bool {
        self.failed_stage() == Some(Stage::LegacyValidate)
    }

    pub fn is_target_validate(&self) -> bool {
        self.failed_stage() == Some(Stage::TargetValidate)
    }

    pub fn is_no_entry_file(&self) -> bool {
        matches!(
            self,
            MigrateError::Stage {
                source: StageError::Pass(PassError::EntryFileNotFound),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_errors_name_the_failed_step() {
        let err = MigrateError::stage(Stage::AutoBindings, PassError::EntryFileNotFound);
        assert_eq!(
            err.to_string(),
            "failed to remove auto-binding declarations: main.spx not found"
        );
        assert!(err.is_no_entry_file());
        assert!(!err.is_legacy_validate());
    }

    #[test]
    fn validation_failures_are_classified_by_gate() {
        let failed = || ValidateError::CommandFailed {
            command: "xgo build .".into(),
            output: "undefined: play".into(),
        };
        let legacy = MigrateError::stage(Stage::LegacyValidate, failed());
        let target = MigrateError::stage(Stage::TargetValidate, failed());
        assert!(legacy.is_legacy_validate() && !legacy.is_target_validate());
        assert!(target.is_target_validate() && !target.is_legacy_validate());
        assert!(target
            .to_string()
            .starts_with("failed to validate migrated project: `xgo build .` failed:"));
    }
}
