//! End-to-end runs of the migration pipeline with a scripted validator.

use pretty_assertions::assert_eq;
use spx_migrator_core::{
    FileSet, MigrateError, Migrator, Stage, ValidateError, Validator, LEGACY_VERSION,
    TARGET_VERSION,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every version it is asked about and fails the ones listed.
#[derive(Clone, Default)]
struct FakeValidator {
    calls: Rc<RefCell<Vec<String>>>,
    failing: Vec<&'static str>,
}

impl FakeValidator {
    fn failing(version: &'static str) -> Self {
        FakeValidator {
            failing: vec![version],
            ..FakeValidator::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Validator for FakeValidator {
    fn validate(&self, _files: &FileSet, version: &str) -> Result<(), ValidateError> {
        self.calls.borrow_mut().push(version.to_owned());
        if self.failing.iter().any(|v| *v == version) {
            return Err(ValidateError::CommandFailed {
                command: "xgo build .".to_owned(),
                output: format!("cannot build against {version}"),
            });
        }
        Ok(())
    }
}

fn project(files: &[(&str, &str)]) -> FileSet {
    let mut set: FileSet = files
        .iter()
        .map(|(path, src)| (path.to_string(), src.as_bytes().to_vec()))
        .collect();
    set.entry("assets/index.json".to_owned())
        .or_insert_with(|| b"{}".to_vec());
    set
}

fn text(files: &FileSet, path: &str) -> String {
    String::from_utf8(files[path].clone()).unwrap()
}

fn migrate(files: &FileSet) -> Result<spx_migrator_core::MigrationResult, MigrateError> {
    Migrator::new(files)
        .with_validator(FakeValidator::default())
        .run()
}

const MAIN: &str = "\
var (
\tCat Cat
\tbgm Sound
\tscore int
)

onStart => {
\tplay bgm, true
\tbroadcast \"go\", true
\tstartBackdrop \"night\", false
}
";

const CAT: &str = "\
onClick => {
\tnextCostume
\tsetEffect ColorEffect, 20
\tgotoFront
\tgoBackLayers 2
\tstep 10, \"run\"
\tanimate \"jump\"
}

onTouchStart => {
\tsay \"hi\"
}
";

fn legacy_project() -> FileSet {
    project(&[
        ("main.spx", MAIN),
        ("Cat.spx", CAT),
        ("Dog.spx", "say \"woof\"\n"),
        ("assets/sounds/bgm/index.json", "{}"),
    ])
}

#[test]
fn full_project_is_migrated() {
    let validator = FakeValidator::default();
    let result = Migrator::new(&legacy_project())
        .with_validator(validator.clone())
        .run()
        .unwrap();

    assert_eq!(
        text(&result.files, "main.spx"),
        "\
var (
\tscore int
)

onStart => {
\tplayAndWait \"bgm\"
\tbroadcastAndWait \"go\"
\tsetBackdrop \"night\"
}
"
    );
    assert_eq!(
        text(&result.files, "Cat.spx"),
        "\
onClick => {
\tsetCostume Next
\tsetGraphicEffect ColorEffect, 20
\tsetLayer Front
\tsetLayer Backward, 2
\tstep 10, 1.0, \"run\"
\tanimateAndWait \"jump\"
}

onTouchStart [\"Cat\", \"Dog\"], => {
\tsay \"hi\"
}
"
    );
    assert_eq!(text(&result.files, "Dog.spx"), "say \"woof\"\n");

    assert_eq!(result.sound_calls_converted, 1);
    assert_eq!(result.auto_bindings_removed, 2);
    assert_eq!(result.costume_apis_converted, 1);
    assert_eq!(result.effect_apis_converted, 1);
    assert_eq!(result.backdrop_apis_converted, 1);
    assert_eq!(result.layer_apis_converted, 2);
    assert_eq!(result.broadcast_apis_converted, 1);
    assert_eq!(result.touch_start_apis_converted, 1);
    assert_eq!(result.movement_apis_converted, 1);
    assert_eq!(result.animation_apis_converted, 1);
    assert_eq!(result.total_changes(), 12);

    assert_eq!(validator.calls(), [LEGACY_VERSION, TARGET_VERSION]);
}

#[test]
fn migrated_output_needs_no_further_changes() {
    let first = migrate(&legacy_project()).unwrap();
    let mut again = Migrator::new(&first.files).with_validator(FakeValidator::default());
    let err = again.run().unwrap_err();
    assert!(err.is_already_compatible(), "{err}");
    assert_eq!(again.files(), &first.files);
}

#[test]
fn caller_files_are_not_modified() {
    let input = legacy_project();
    let before = input.clone();
    migrate(&input).unwrap();
    assert_eq!(input, before);
}

#[test]
fn sound_resource_becomes_string() {
    let result = migrate(&project(&[
        ("main.spx", "onStart => {\n\tplay bgm\n}\n"),
        ("assets/sounds/bgm/index.json", "{}"),
    ]))
    .unwrap();
    assert_eq!(text(&result.files, "main.spx"), "onStart => {\n\tplay \"bgm\"\n}\n");
    assert_eq!(result.sound_calls_converted, 1);
}

#[test]
fn step_with_animation_keeps_literal_distance() {
    let result = migrate(&project(&[
        ("main.spx", ""),
        ("Cat.spx", "onClick => {\n\tstep 10, \"run\"\n}\n"),
    ]))
    .unwrap();
    assert_eq!(
        text(&result.files, "Cat.spx"),
        "onClick => {\n\tstep 10, 1.0, \"run\"\n}\n"
    );
    assert_eq!(result.movement_apis_converted, 1);
}

#[test]
fn go_back_layers_becomes_set_layer() {
    let result = migrate(&project(&[
        ("main.spx", ""),
        ("Cat.spx", "onClick => {\n\tgoBackLayers 2\n}\n"),
    ]))
    .unwrap();
    assert_eq!(
        text(&result.files, "Cat.spx"),
        "onClick => {\n\tsetLayer Backward, 2\n}\n"
    );
}

#[test]
fn capitalized_method_spelling_is_preserved() {
    let result = migrate(&project(&[
        ("main.spx", ""),
        ("Cat.spx", "onClick => {\n\tthis.Play bgm, true\n\tthis.NextCostume\n}\n"),
        ("assets/sounds/bgm/index.json", "{}"),
    ]))
    .unwrap();
    assert_eq!(
        text(&result.files, "Cat.spx"),
        "onClick => {\n\tthis.PlayAndWait \"bgm\"\n\tthis.SetCostume Next\n}\n"
    );
}

#[test]
fn removed_api_aborts_before_rewriting() {
    let input = project(&[
        ("main.spx", "onStart => {\n\tplay bgm\n}\n"),
        ("Cat.spx", "onClick => {\n\tnextCostume\n\tmouseHitItem\n}\n"),
        ("assets/sounds/bgm/index.json", "{}"),
    ]);
    let validator = FakeValidator::default();
    let mut migrator = Migrator::new(&input).with_validator(validator.clone());

    let err = migrator.run().unwrap_err();
    assert!(err.is_removed_apis());
    let message = err.to_string();
    assert!(message.contains("1 occurrence(s) found"), "{message}");
    assert!(message.contains("Cat.spx:3:2: mouseHitItem"), "{message}");
    assert_eq!(migrator.files(), &input);
    assert_eq!(validator.calls(), [LEGACY_VERSION]);
}

#[test]
fn project_already_in_target_form_is_reported() {
    let input = project(&[
        ("main.spx", "onStart => {\n\tplay \"bgm\", true\n}\n"),
        ("Cat.spx", "onTouchStart [\"Cat\"], => {\n}\n"),
        ("assets/sounds/bgm/index.json", "{}"),
    ]);
    let mut migrator = Migrator::new(&input).with_validator(FakeValidator::default());
    let err = migrator.run().unwrap_err();
    assert!(matches!(err, MigrateError::AlreadyCompatible));
    assert_eq!(migrator.files(), &input);
}

#[test]
fn legacy_build_failure_stops_the_run() {
    let validator = FakeValidator::failing(LEGACY_VERSION);
    let err = Migrator::new(&legacy_project())
        .with_validator(validator.clone())
        .run()
        .unwrap_err();
    assert!(err.is_legacy_validate());
    assert!(err
        .to_string()
        .starts_with("failed to validate with legacy spx version:"));
    assert_eq!(validator.calls(), [LEGACY_VERSION]);
}

#[test]
fn target_build_failure_returns_no_result() {
    let err = Migrator::new(&legacy_project())
        .with_validator(FakeValidator::failing(TARGET_VERSION))
        .run()
        .unwrap_err();
    assert!(err.is_target_validate());
    assert_eq!(err.failed_stage(), Some(Stage::TargetValidate));
}

#[test]
fn missing_entry_file_fails_auto_binding_removal() {
    let err = migrate(&project(&[("Cat.spx", "onClick => {\n\tnextCostume\n}\n")])).unwrap_err();
    assert!(err.is_no_entry_file());
    assert_eq!(err.failed_stage(), Some(Stage::AutoBindings));
}

#[test]
fn project_without_assets_is_unsupported() {
    let files: FileSet = [("main.spx".to_owned(), b"play bgm\n".to_vec())]
        .into_iter()
        .collect();
    let err = migrate(&files).unwrap_err();
    assert_eq!(err.failed_stage(), Some(Stage::ScanResources));
}

#[test]
fn unparseable_file_is_left_alone() {
    let broken = "onClick => {\n\tnextCostume\n";
    let result = migrate(&project(&[
        ("main.spx", "onStart => {\n\tanimate \"spin\"\n}\n"),
        ("Broken.spx", broken),
    ]))
    .unwrap();
    assert_eq!(text(&result.files, "Broken.spx"), broken);
    assert_eq!(
        text(&result.files, "main.spx"),
        "onStart => {\n\tanimateAndWait \"spin\"\n}\n"
    );
}

const XGO_CAT: &str = "\
onClick => {
\tanimate \"jump\"
\tfor i <- 1:3 {
\t\tsay i
\t}
\tdoubled := [x*2 for x <- :4 if x > 0]
\tload()!
}
";

#[test]
fn removed_api_is_found_next_to_range_loops() {
    let input = project(&[
        ("main.spx", ""),
        ("Cat.spx", &format!("{XGO_CAT}\nonStart => {{\n\tmouseHitItem\n}}\n")),
    ]);
    let err = migrate(&input).unwrap_err();
    assert!(err.is_removed_apis());
    let message = err.to_string();
    assert!(message.contains("Cat.spx:11:2: mouseHitItem"), "{message}");
}

#[test]
fn files_with_range_loops_and_comprehensions_are_migrated() {
    let result = migrate(&project(&[("main.spx", ""), ("Cat.spx", XGO_CAT)])).unwrap();
    assert_eq!(
        text(&result.files, "Cat.spx"),
        XGO_CAT.replace("animate ", "animateAndWait ")
    );
    assert_eq!(result.animation_apis_converted, 1);
}
