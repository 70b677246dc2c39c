//! The migration pipeline.
//!
//! Scan resources, validate against the legacy runtime, refuse removed
//! APIs, run every rewrite pass in order, then validate against the target
//! runtime. Any failure aborts the run and no result is returned.

use crate::error::{MigrateError, PassError, Stage};
use crate::passes::{
    animation, auto_binding, backdrop, broadcast, costume, effect, layer, movement, sound,
    touch_start,
};
use crate::removed_api::{scan_removed_apis, RemovedApisError};
use crate::resources::scan_resources;
use crate::validate::{CommandValidator, Validator};
use crate::{FileSet, LEGACY_VERSION, TARGET_VERSION};
use serde::Serialize;
use tracing::{debug, info};

/// A migrated project and what each pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationResult {
    #[serde(skip)]
    pub files: FileSet,
    pub sound_calls_converted: usize,
    pub auto_bindings_removed: usize,
    pub costume_apis_converted: usize,
    pub effect_apis_converted: usize,
    pub backdrop_apis_converted: usize,
    pub layer_apis_converted: usize,
    pub broadcast_apis_converted: usize,
    pub touch_start_apis_converted: usize,
    pub movement_apis_converted: usize,
    pub animation_apis_converted: usize,
}

impl MigrationResult {
    pub fn total_changes(&self) -> usize {
        self.sound_calls_converted
            + self.auto_bindings_removed
            + self.costume_apis_converted
            + self.effect_apis_converted
            + self.backdrop_apis_converted
            + self.layer_apis_converted
            + self.broadcast_apis_converted
            + self.touch_start_apis_converted
            + self.movement_apis_converted
            + self.animation_apis_converted
    }
}

/// Migrates one project. Build a new one per project.
pub struct Migrator {
    files: FileSet,
    validator: Box<dyn Validator>,
}

impl Migrator {
    /// Copies `files`; the caller's map is never modified. Validation runs
    /// the default [`CommandValidator`].
    pub fn new(files: &FileSet) -> Self {
        Migrator {
            files: files.clone(),
            validator: Box::new(CommandValidator::default()),
        }
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// The working copy, as left by the last completed stage.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn run(&mut self) -> Result<MigrationResult, MigrateError> {
        info!(files = self.files.len(), "scanning resources");
        let resources =
            scan_resources(&self.files).map_err(|e| MigrateError::stage(Stage::ScanResources, e))?;
        debug!(
            sounds = resources.sounds.len(),
            sprites = resources.sprites.len(),
            "resources scanned"
        );

        info!(version = LEGACY_VERSION, "validating legacy project");
        self.validator
            .validate(&self.files, LEGACY_VERSION)
            .map_err(|e| MigrateError::stage(Stage::LegacyValidate, e))?;

        let usages = scan_removed_apis(&self.files);
        if !usages.is_empty() {
            info!(count = usages.len(), "removed APIs in use");
            return Err(RemovedApisError { usages }.into());
        }

        info!("rewriting");
        let files = &mut self.files;
        let mut result = MigrationResult {
            sound_calls_converted: pass(Stage::SoundCalls, || {
                sound::convert_sound_calls(files, &resources)
            })?,
            ..MigrationResult::default()
        };
        result.auto_bindings_removed = pass(Stage::AutoBindings, || {
            auto_binding::remove_auto_bindings(files, &resources)
        })?;
        result.costume_apis_converted =
            pass(Stage::Costume, || costume::convert_costume_apis(files))?;
        result.effect_apis_converted = pass(Stage::Effect, || effect::convert_effect_apis(files))?;
        result.backdrop_apis_converted =
            pass(Stage::Backdrop, || backdrop::convert_backdrop_apis(files))?;
        result.layer_apis_converted = pass(Stage::Layer, || layer::convert_layer_apis(files))?;
        result.broadcast_apis_converted =
            pass(Stage::Broadcast, || broadcast::convert_broadcast_apis(files))?;
        result.touch_start_apis_converted = pass(Stage::TouchStart, || {
            touch_start::convert_touch_start(files, &resources)
        })?;
        result.movement_apis_converted =
            pass(Stage::Movement, || movement::convert_movement_apis(files))?;
        result.animation_apis_converted =
            pass(Stage::Animation, || animation::convert_animation_apis(files))?;

        info!(version = TARGET_VERSION, "validating migrated project");
        self.validator
            .validate(&self.files, TARGET_VERSION)
            .map_err(|e| MigrateError::stage(Stage::TargetValidate, e))?;

        let total = result.total_changes();
        if total == 0 {
            info!("nothing to migrate");
            return Err(MigrateError::AlreadyCompatible);
        }
        info!(changes = total, "migration complete");
        result.files = self.files.clone();
        Ok(result)
    }
}

fn pass(
    stage: Stage,
    run: impl FnOnce() -> Result<usize, PassError>,
) -> Result<usize, MigrateError> {
    let count = run().map_err(|e| MigrateError::stage(stage, e))?;
    debug!(%stage, count, "pass finished");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_counters_without_files() {
        let result = MigrationResult {
            files: [("main.spx".to_owned(), b"play \"bgm\"\n".to_vec())].into(),
            sound_calls_converted: 2,
            layer_apis_converted: 1,
            ..MigrationResult::default()
        };
        assert_eq!(result.total_changes(), 3);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("files").is_none());
        assert_eq!(json["sound_calls_converted"], 2);
        assert_eq!(json["layer_apis_converted"], 1);
        assert_eq!(json["animation_apis_converted"], 0);
    }
}
