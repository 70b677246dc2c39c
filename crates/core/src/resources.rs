//! Project resource scan: which identifiers name sounds and sprites.

use crate::error::ScanError;
use crate::naming::{is_entry_file, is_spx_file};
use crate::FileSet;
use serde::Serialize;
use std::collections::BTreeSet;

const ASSETS_DIR: &str = "assets/";
const SOUNDS_DIR: &str = "assets/sounds/";

/// Sound and sprite names declared by a project. Sorted, so that anything
/// generated from it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceSet {
    /// `<name>` of every `assets/sounds/<name>/...` entry.
    pub sounds: BTreeSet<String>,
    /// File stem of every class file other than the entry file.
    pub sprites: BTreeSet<String>,
}

impl ResourceSet {
    pub fn is_sound(&self, name: &str) -> bool {
        self.sounds.contains(name)
    }

    pub fn is_sprite(&self, name: &str) -> bool {
        self.sprites.contains(name)
    }
}

pub fn scan_resources(files: &FileSet) -> Result<ResourceSet, ScanError> {
    if !files.keys().any(|path| path.starts_with(ASSETS_DIR)) {
        return Err(ScanError::UnsupportedStructure);
    }

    let mut resources = ResourceSet::default();
    for path in files.keys() {
        if let Some(rest) = path.strip_prefix(SOUNDS_DIR) {
            if let Some((name, _)) = rest.split_once('/') {
                if !name.is_empty() {
                    resources.sounds.insert(name.to_owned());
                }
            }
            continue;
        }
        if is_spx_file(path) && !is_entry_file(path) {
            let file_name = path.rsplit('/').next().unwrap_or(path);
            if let Some(stem) = file_name.strip_suffix(".spx") {
                if !stem.is_empty() {
                    resources.sprites.insert(stem.to_owned());
                }
            }
        }
    }
    Ok(resources)
}
