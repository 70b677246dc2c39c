//! The `migrate` and `batch` subcommands.
//!
//! Both load a project, run the core pipeline and write the migrated
//! project plus a unified diff next to it. When a skip flag tolerates a
//! failure, a `.skip` marker recording the reason is written instead.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use serde_json::json;
use spx_migrator_core::{
    CommandValidator, MigrateError, MigrationResult, Migrator, NoopValidator, ValidatorConfig,
    LEGACY_VERSION, TARGET_VERSION,
};
use tracing::{info, warn};

use crate::diff::{generate_diff, DiffError};
use crate::project::{migrated_path, with_extension, Project, ProjectError};
use crate::{report_error, OutputFormat, RunArgs};

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("failed to generate diff file: {0}")]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Migrate(#[from] MigrateError),

    #[error("could not write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not read directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    /// The message shown to the user, with guidance for removed APIs.
    fn report(&self) -> String {
        match self {
            CliError::Migrate(err @ MigrateError::RemovedApis(_)) => format!(
                "migration aborted: detected removed APIs with no replacements\n\
                 please remove or refactor these usages before migrating\n\n{err}"
            ),
            CliError::Migrate(err) => format!("failed to migrate: {err}"),
            other => other.to_string(),
        }
    }
}

/// Why a project was set aside instead of migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SkipReason {
    LegacyValidateFailed,
    RemovedApis,
    NoMain,
    TargetValidateFailed,
}

impl SkipReason {
    pub const ALL: [SkipReason; 4] = [
        SkipReason::LegacyValidateFailed,
        SkipReason::NoMain,
        SkipReason::RemovedApis,
        SkipReason::TargetValidateFailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::LegacyValidateFailed => "legacy-validate-failed",
            SkipReason::RemovedApis => "removed-apis",
            SkipReason::NoMain => "no-main",
            SkipReason::TargetValidateFailed => "target-validate-failed",
        }
    }

    /// The reason `err` may be skipped under, if its skip flag is set.
    pub fn classify(err: &MigrateError, args: &RunArgs) -> Option<Self> {
        if args.skip_legacy_validate && err.is_legacy_validate() {
            Some(SkipReason::LegacyValidateFailed)
        } else if args.skip_removed_apis && err.is_removed_apis() {
            Some(SkipReason::RemovedApis)
        } else if args.skip_no_main && err.is_no_entry_file() {
            Some(SkipReason::NoMain)
        } else if args.skip_target_validate && err.is_target_validate() {
            Some(SkipReason::TargetValidateFailed)
        } else {
            None
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of a `.skip` marker.
pub(crate) fn skip_marker(reason: SkipReason, err: &MigrateError) -> String {
    format!("reason={reason}\nerror={err}\n")
}

/// How one project ended.
#[derive(Debug)]
pub(crate) enum Outcome {
    Migrated {
        result: MigrationResult,
        output: PathBuf,
        diff: PathBuf,
    },
    Skipped {
        reason: SkipReason,
        marker: PathBuf,
        error: String,
    },
    AlreadyCompatible,
}

impl Outcome {
    fn to_json(&self, input: &Path) -> serde_json::Value {
        match self {
            Outcome::Migrated {
                result,
                output,
                diff,
            } => json!({
                "input": input.display().to_string(),
                "status": "migrated",
                "output": output.display().to_string(),
                "diff": diff.display().to_string(),
                "from": LEGACY_VERSION,
                "to": TARGET_VERSION,
                "changes": result,
                "total_changes": result.total_changes(),
            }),
            Outcome::Skipped {
                reason,
                marker,
                error,
            } => json!({
                "input": input.display().to_string(),
                "status": "skipped",
                "reason": reason.as_str(),
                "marker": marker.display().to_string(),
                "error": error,
            }),
            Outcome::AlreadyCompatible => json!({
                "input": input.display().to_string(),
                "status": "already-compatible",
            }),
        }
    }
}

/// Where one project's outputs go.
struct Targets {
    output: PathBuf,
    diff: PathBuf,
    skip: PathBuf,
}

fn migrator_for(project: &Project, args: &RunArgs) -> Migrator {
    let migrator = Migrator::new(&project.files);
    if args.no_validate {
        return migrator.with_validator(NoopValidator);
    }
    migrator.with_validator(CommandValidator::new(ValidatorConfig {
        program: args.validator_program.clone(),
        ..ValidatorConfig::default()
    }))
}

fn run_project(project: &Project, targets: &Targets, args: &RunArgs) -> Result<Outcome, CliError> {
    let err = match migrator_for(project, args).run() {
        Ok(mut result) => {
            project.strip_placeholder(&mut result.files);
            project.write(&result.files, &targets.output)?;
            let diff = generate_diff(&project.original_files(), &result.files)?;
            write(&targets.diff, diff.as_bytes())?;
            return Ok(Outcome::Migrated {
                result,
                output: targets.output.clone(),
                diff: targets.diff.clone(),
            });
        }
        Err(err) => err,
    };
    if err.is_already_compatible() {
        return Ok(Outcome::AlreadyCompatible);
    }
    match SkipReason::classify(&err, args) {
        Some(reason) => {
            warn!(%reason, error = %err, "skipping project");
            write(&targets.skip, skip_marker(reason, &err).as_bytes())?;
            Ok(Outcome::Skipped {
                reason,
                marker: targets.skip.clone(),
                error: err.to_string(),
            })
        }
        None => Err(err.into()),
    }
}

fn fail(err: CliError, output: OutputFormat, quiet: bool) -> ! {
    report_error(&err.report(), output, quiet);
    process::exit(1);
}

fn write(path: &Path, content: &[u8]) -> Result<(), CliError> {
    let write_err = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}

// ── migrate ──────────────────────────────────────────────────────────

pub(crate) fn cmd_migrate(
    input: &Path,
    out: Option<&Path>,
    diff: Option<&Path>,
    args: &RunArgs,
    output: OutputFormat,
    quiet: bool,
) {
    let output_path = out.map(Path::to_path_buf).unwrap_or_else(|| migrated_path(input));
    let file_output = input.is_file();
    let targets = Targets {
        diff: diff
            .map(Path::to_path_buf)
            .unwrap_or_else(|| with_extension(&output_path, "diff", file_output)),
        skip: with_extension(&output_path, "skip", file_output),
        output: output_path,
    };

    let text = output == OutputFormat::Text && !quiet;
    if text {
        println!("spx 2.0 migration tool");
        println!("Input:  {}", input.display());
        println!("Output: {}", targets.output.display());
        println!("Migration: {} -> {}", LEGACY_VERSION, TARGET_VERSION);
        println!();
    }

    let outcome = Project::load(input)
        .map_err(CliError::from)
        .and_then(|project| run_project(&project, &targets, args));
    let outcome = outcome.unwrap_or_else(|e| fail(e, output, quiet));

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome.to_json(input))
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text if !quiet => print_outcome(&outcome),
        OutputFormat::Text => {}
    }
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Migrated {
            result,
            output,
            diff,
        } => print_success(result, output, diff),
        Outcome::Skipped { reason, marker, .. } => {
            println!("Skipped due to {}. Wrote {}", reason, marker.display());
        }
        Outcome::AlreadyCompatible => {
            println!("Project is already compatible with the latest spx version!");
            println!("No migration needed.");
        }
    }
}

fn print_success(result: &MigrationResult, output: &Path, diff: &Path) {
    println!("Migration completed successfully!");
    println!("  Migrated from: {}", LEGACY_VERSION);
    println!("  Migrated to: {}", TARGET_VERSION);
    println!("  Sound calls converted: {}", result.sound_calls_converted);
    println!("  Auto-bindings removed: {}", result.auto_bindings_removed);
    println!("  Costume APIs converted: {}", result.costume_apis_converted);
    println!("  Effect APIs converted: {}", result.effect_apis_converted);
    println!("  Backdrop APIs converted: {}", result.backdrop_apis_converted);
    println!("  Layer APIs converted: {}", result.layer_apis_converted);
    println!("  Broadcast APIs converted: {}", result.broadcast_apis_converted);
    println!(
        "  onTouchStart APIs converted: {}",
        result.touch_start_apis_converted
    );
    println!("  Movement APIs converted: {}", result.movement_apis_converted);
    println!(
        "  Animation APIs converted: {}",
        result.animation_apis_converted
    );
    println!("  Output: {}", output.display());
    println!("  Diff: {}", diff.display());
}

// ── batch ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct BatchSummary {
    migrated: usize,
    already_compatible: usize,
    skipped: Vec<SkipReason>,
    placeholders: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Migrated { .. } => self.migrated += 1,
            Outcome::Skipped { reason, .. } => self.skipped.push(*reason),
            Outcome::AlreadyCompatible => self.already_compatible += 1,
        }
    }

    fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|r| **r == reason).count()
    }

    fn print(&self, out_dir: &Path) {
        println!(
            "Completed batch migration. {} migrated, {} skipped. Output dir: {}",
            self.migrated,
            self.skipped.len(),
            out_dir.display()
        );
        if self.already_compatible > 0 {
            println!("  - Already compatible: {}", self.already_compatible);
        }
        if !self.skipped.is_empty() {
            for reason in SkipReason::ALL {
                println!("  - Skipped ({}): {}", reason, self.skipped_for(reason));
            }
        }
        if self.placeholders > 0 {
            println!(
                "  - No-assets projects (placeholder injected): {}",
                self.placeholders
            );
        }
    }

    fn to_json(&self, out_dir: &Path, projects: Vec<serde_json::Value>) -> serde_json::Value {
        let by_reason: serde_json::Map<String, serde_json::Value> = SkipReason::ALL
            .iter()
            .map(|r| (r.as_str().to_owned(), json!(self.skipped_for(*r))))
            .collect();
        json!({
            "out_dir": out_dir.display().to_string(),
            "migrated": self.migrated,
            "skipped": self.skipped.len(),
            "already_compatible": self.already_compatible,
            "skipped_by_reason": by_reason,
            "placeholders_injected": self.placeholders,
            "projects": projects,
        })
    }
}

/// `*.json` file maps directly inside `dir`, sorted by name.
fn batch_inputs(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let read_err = |source| CliError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn batch_targets(input: &Path, out_dir: &Path) -> Targets {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = |ext: &str| out_dir.join(format!("{stem}_migrated.{ext}"));
    Targets {
        output: target("json"),
        diff: target("diff"),
        skip: target("skip"),
    }
}

pub(crate) fn cmd_batch(
    dir: &Path,
    out_dir: &Path,
    args: &RunArgs,
    output: OutputFormat,
    quiet: bool,
) {
    let text = output == OutputFormat::Text && !quiet;
    let inputs = batch_inputs(dir).unwrap_or_else(|e| fail(e, output, quiet));
    if let Err(source) = fs::create_dir_all(out_dir) {
        let e = CliError::Write {
            path: out_dir.to_path_buf(),
            source,
        };
        fail(e, output, quiet);
    }
    if text {
        println!("spx 2.0 migration tool");
        println!("Input dir: {}", dir.display());
        println!("Migration: {} -> {}", LEGACY_VERSION, TARGET_VERSION);
        println!();
    }

    let mut summary = BatchSummary::default();
    let mut projects = Vec::new();
    for input in &inputs {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(project = %name, "migrating");
        let project = Project::load(input).unwrap_or_else(|e| fail(e.into(), output, quiet));
        if project.placeholder {
            summary.placeholders += 1;
        }
        let targets = batch_targets(input, out_dir);
        let outcome =
            run_project(&project, &targets, args).unwrap_or_else(|e| fail(e, output, quiet));
        if text {
            match &outcome {
                Outcome::Migrated { output, .. } => {
                    println!("[{}] Migrated. Wrote {}", name, output.display())
                }
                Outcome::Skipped { reason, marker, .. } => {
                    println!("[{}] Skipped due to {}. Wrote {}", name, reason, marker.display())
                }
                Outcome::AlreadyCompatible => println!("[{}] Already compatible", name),
            }
        }
        summary.record(&outcome);
        projects.push(outcome.to_json(input));
    }

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary.to_json(out_dir, projects))
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text if !quiet => {
            println!();
            summary.print(out_dir);
        }
        OutputFormat::Text => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spx_migrator_core::{PassError, Stage, ValidateError};

    fn args() -> RunArgs {
        RunArgs {
            skip_legacy_validate: true,
            skip_removed_apis: false,
            skip_no_main: true,
            skip_target_validate: false,
            validator_program: "xgo".to_owned(),
            no_validate: true,
        }
    }

    fn build_failure(stage: Stage) -> MigrateError {
        MigrateError::stage(
            stage,
            ValidateError::CommandFailed {
                command: "xgo build .".into(),
                output: "undefined: play".into(),
            },
        )
    }

    #[test]
    fn errors_are_skipped_only_when_their_flag_is_set() {
        let args = args();
        assert_eq!(
            SkipReason::classify(&build_failure(Stage::LegacyValidate), &args),
            Some(SkipReason::LegacyValidateFailed)
        );
        assert_eq!(
            SkipReason::classify(&build_failure(Stage::TargetValidate), &args),
            None
        );
        let no_main = MigrateError::stage(Stage::AutoBindings, PassError::EntryFileNotFound);
        assert_eq!(
            SkipReason::classify(&no_main, &args),
            Some(SkipReason::NoMain)
        );
        assert_eq!(
            SkipReason::classify(&MigrateError::AlreadyCompatible, &args),
            None
        );
    }

    #[test]
    fn skip_marker_records_reason_and_error() {
        let err = MigrateError::stage(Stage::AutoBindings, PassError::EntryFileNotFound);
        assert_eq!(
            skip_marker(SkipReason::NoMain, &err),
            "reason=no-main\nerror=failed to remove auto-binding declarations: main.spx not found\n"
        );
    }

    #[test]
    fn batch_outputs_are_named_after_the_record() {
        let targets = batch_targets(Path::new("in/project_42.json"), Path::new("out"));
        assert_eq!(targets.output, Path::new("out/project_42_migrated.json"));
        let dotted = batch_targets(Path::new("in/game.v1.json"), Path::new("out"));
        assert_eq!(dotted.skip, Path::new("out/game.v1_migrated.skip"));
        assert_eq!(targets.diff, Path::new("out/project_42_migrated.diff"));
        assert_eq!(targets.skip, Path::new("out/project_42_migrated.skip"));
    }

    #[test]
    fn summary_counts_by_reason() {
        let mut summary = BatchSummary::default();
        summary.record(&Outcome::AlreadyCompatible);
        for reason in [SkipReason::NoMain, SkipReason::NoMain, SkipReason::RemovedApis] {
            summary.record(&Outcome::Skipped {
                reason,
                marker: PathBuf::new(),
                error: String::new(),
            });
        }
        assert_eq!(summary.skipped_for(SkipReason::NoMain), 2);
        assert_eq!(summary.skipped_for(SkipReason::RemovedApis), 1);
        let json = summary.to_json(Path::new("out"), Vec::new());
        assert_eq!(json["skipped"], 3);
        assert_eq!(json["already_compatible"], 1);
        assert_eq!(json["skipped_by_reason"]["no-main"], 2);
    }
}
