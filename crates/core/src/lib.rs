//! spx-migrator-core: upgrades spx projects from the legacy 2.0 pre-release
//! API to the current one.
//!
//! A project is a [`FileSet`] (relative path to bytes). [`Migrator::run`]
//! scans its resources, checks that it builds against [`LEGACY_VERSION`],
//! refuses projects that use APIs with no replacement, applies the rewrite
//! passes in order and finally checks that the result builds against
//! [`TARGET_VERSION`].
//!
//! # Public API
//!
//! - [`Migrator`] and [`MigrationResult`]: the pipeline and its outcome
//! - [`MigrateError`], [`Stage`]: failures, tagged with the failing step
//! - [`Validator`], [`CommandValidator`], [`ValidatorConfig`]: the build gate
//! - [`scan_resources`], [`scan_removed_apis`]: the read-only scans
//! - [`passes`]: the individual rewrites, usable on their own

use std::collections::BTreeMap;

/// spx runtime version projects are migrated from.
pub const LEGACY_VERSION: &str = "v2.0.0-pre.5";
/// spx runtime version projects are migrated to.
pub const TARGET_VERSION: &str = "v2.0.0-pre.9";

/// Project files keyed by slash-separated relative path.
pub type FileSet = BTreeMap<String, Vec<u8>>;

pub mod error;
pub mod migrator;
pub mod naming;
pub mod passes;
pub mod removed_api;
pub mod resources;
pub mod validate;

// ── Convenience re-exports ───────────────────────────────────────────

pub use error::{MigrateError, PassError, ScanError, Stage, StageError, ValidateError};
pub use migrator::{MigrationResult, Migrator};
pub use removed_api::{scan_removed_apis, RemovedApisError, RemovedUsage};
pub use resources::{scan_resources, ResourceSet};
pub use validate::{CommandValidator, NoopValidator, Validator, ValidatorConfig};
